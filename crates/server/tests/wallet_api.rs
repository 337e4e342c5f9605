//! Wallet API tests: portfolio, addresses, sends, transfers, burns and
//! network info against `MockGateway`.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};
use tapdash_core::gateway::{GatewayError, UniverseStats};
use tapdash_core::testing::RecordedCall;

async fn fixture_with_gold() -> TestFixture {
    let fixture = TestFixture::new();
    fixture
        .gateway
        .set_assets(vec![
            fixtures::asset("Gold", "aa", 60),
            fixtures::asset("Gold", "aa", 40),
            fixtures::asset("Silver", "bb", 5),
        ])
        .await;
    fixture
        .gateway
        .set_balances(vec![
            fixtures::balance("Gold", "aa", 100),
            fixtures::balance("Silver", "bb", 5),
        ])
        .await;
    fixture
}

#[tokio::test]
async fn test_portfolio_groups_holdings() {
    let fixture = fixture_with_gold().await;

    let response = fixture.get("/api/v1/assets").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["assets"].as_array().unwrap().len(), 3);
    assert_eq!(response.body["balances"]["aa"]["balance"], "100");

    let holdings = response.body["holdings"].as_array().unwrap();
    assert_eq!(holdings.len(), 2);
    let gold = holdings.iter().find(|h| h["asset_id"] == "aa").unwrap();
    assert_eq!(gold["total_amount"], 100);
    assert_eq!(gold["outputs"], 2);
    assert_eq!(gold["name"], "Gold");
}

#[tokio::test]
async fn test_portfolio_fails_when_either_part_fails() {
    let fixture = fixture_with_gold().await;
    fixture
        .gateway
        .fail_operation(
            "list_balances",
            GatewayError::Http {
                status: 500,
                message: "wallet locked".to_string(),
            },
        )
        .await;

    let response = fixture.get("/api/v1/assets").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "wallet locked");
}

#[tokio::test]
async fn test_create_address_defaults_amount() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/addresses", json!({ "asset_id": "aa", "amount": "0" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["encoded"]
        .as_str()
        .unwrap()
        .starts_with("taprt1mockaddr"));
    assert_eq!(response.body["amount"], "1");

    let response = fixture
        .post("/api/v1/addresses", json!({ "asset_id": "aa", "amount": 25 }))
        .await;
    assert_eq!(response.body["amount"], "25");

    let list = fixture.get("/api/v1/addresses").await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["count"], 2);
}

#[tokio::test]
async fn test_create_address_requires_asset() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/addresses", json!({ "asset_id": " " }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(fixture.gateway.count("new_address").await, 0);
}

#[tokio::test]
async fn test_send_uses_fixed_fee_rate() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/send", json!({ "address": "taprt1xyz" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["transfer"].is_object());

    let calls = fixture.gateway.calls().await;
    let RecordedCall::Send(request) = &calls[0] else {
        panic!("expected send call, got {:?}", calls[0]);
    };
    assert_eq!(request.tap_addrs, vec!["taprt1xyz".to_string()]);
    assert_eq!(request.fee_rate, 1000);

    let transfers = fixture.get("/api/v1/transfers").await;
    assert_eq!(transfers.body["count"], 1);
}

#[tokio::test]
async fn test_send_requires_address() {
    let fixture = TestFixture::new();

    let response = fixture.post("/api/v1/send", json!({ "address": "" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Address is required");
}

#[tokio::test]
async fn test_burn_requires_confirmation() {
    let fixture = fixture_with_gold().await;

    let response = fixture
        .post(
            "/api/v1/burns",
            json!({ "asset_id": "aa", "amount": "10", "confirm": "burn" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Please type BURN to confirm");
    assert_eq!(fixture.gateway.count("burn").await, 0);
}

#[tokio::test]
async fn test_burn_amount_bounded_by_holding() {
    let fixture = fixture_with_gold().await;

    let response = fixture
        .post(
            "/api/v1/burns",
            json!({ "asset_id": "aa", "amount": "101", "confirm": "BURN" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Amount must be between 1 and 100");
}

#[tokio::test]
async fn test_burn_success() {
    let fixture = fixture_with_gold().await;

    let response = fixture
        .post(
            "/api/v1/burns",
            json!({ "asset_id": "aa", "amount": "30", "note": "cleanup", "confirm": "BURN" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);

    let burns = fixture.get("/api/v1/burns").await;
    assert_eq!(burns.body["count"], 1);
    assert_eq!(burns.body["burns"][0]["amount"], "30");
    assert_eq!(burns.body["burns"][0]["note"], "cleanup");

    let calls = fixture.gateway.calls().await;
    assert!(calls.iter().any(|c| matches!(
        c,
        RecordedCall::Burn(r) if r.confirmation_text == "assets will be destroyed"
    )));
}

#[tokio::test]
async fn test_burn_anchor_error_is_explained() {
    let fixture = fixture_with_gold().await;
    fixture
        .gateway
        .fail_operation(
            "burn",
            GatewayError::Application {
                code: 2,
                message: "burning all assets of an anchor output is not supported".to_string(),
            },
        )
        .await;

    let response = fixture
        .post(
            "/api/v1/burns",
            json!({ "asset_id": "bb", "amount": "5", "confirm": "BURN" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .starts_with("Cannot burn: This is the only asset in its UTXO"));
}

#[tokio::test]
async fn test_network_overview() {
    let fixture = TestFixture::new();
    fixture
        .gateway
        .set_universe_stats(UniverseStats {
            num_total_assets: Some(12),
            num_total_groups: Some(3),
            num_total_syncs: Some(40),
            num_total_proofs: Some(80),
        })
        .await;

    let response = fixture.get("/api/v1/network").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["universe_stats"]["num_total_assets"], 12);
    assert_eq!(response.body["daemon_info"]["network"], "regtest");
    assert!(response.body["asset_stats"].is_array());
}

#[tokio::test]
async fn test_network_overview_tolerates_partial_failure() {
    let fixture = TestFixture::new();
    fixture
        .gateway
        .fail_operation("daemon_info", GatewayError::Timeout)
        .await;

    let response = fixture.get("/api/v1/network").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.get("daemon_info").is_none());
    assert!(response.body["universe_stats"].is_object());
}
