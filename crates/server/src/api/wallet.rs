//! Wallet API handlers: assets, addresses, sends, transfers, burns, network.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tapdash_core::gateway::{Address, Asset, AssetBalance, Burn, Transfer};
use tapdash_core::wallet::{BurnInput, Holding, NetworkOverview};
use tapdash_core::WalletError;

use super::handlers::{wallet_error, ApiError};
use crate::metrics::record_wallet_error;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub assets: Vec<Asset>,
    pub balances: BTreeMap<String, AssetBalance>,
    /// Assets grouped by id.
    pub holdings: Vec<Holding>,
}

#[derive(Debug, Serialize)]
pub struct AddressListResponse {
    pub addresses: Vec<Address>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateAddressRequest {
    pub asset_id: String,
    /// Empty, zero or negative means 1.
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct TransferListResponse {
    pub transfers: Vec<Transfer>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct BurnListResponse {
    pub burns: Vec<Burn>,
    pub count: usize,
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn reply<T>(result: Result<T, WalletError>) -> Result<Json<T>, ApiError> {
    result.map(Json).map_err(|e| {
        record_wallet_error(&e);
        wallet_error(e)
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Assets, balances and per-asset totals
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PortfolioResponse>, ApiError> {
    reply(state.wallet().portfolio().await.map(|portfolio| {
        let holdings = portfolio.holdings();
        PortfolioResponse {
            assets: portfolio.assets,
            balances: portfolio.balances,
            holdings,
        }
    }))
}

pub async fn list_addresses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AddressListResponse>, ApiError> {
    reply(state.wallet().addresses().await.map(|addresses| {
        let count = addresses.len();
        AddressListResponse { addresses, count }
    }))
}

/// Create a receive address
pub async fn create_address(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAddressRequest>,
) -> Result<Json<Address>, ApiError> {
    reply(
        state
            .wallet()
            .new_address(&request.asset_id, &request.amount)
            .await,
    )
}

/// Send to a Taproot Assets address
pub async fn send(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendBody>,
) -> Result<Json<Value>, ApiError> {
    reply(state.wallet().send(&body.address).await)
}

pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TransferListResponse>, ApiError> {
    reply(state.wallet().transfers().await.map(|transfers| {
        let count = transfers.len();
        TransferListResponse { transfers, count }
    }))
}

pub async fn list_burns(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BurnListResponse>, ApiError> {
    reply(state.wallet().burns().await.map(|burns| {
        let count = burns.len();
        BurnListResponse { burns, count }
    }))
}

/// Burn assets (requires `confirm: "BURN"`)
pub async fn burn(
    State(state): State<Arc<AppState>>,
    Json(input): Json<BurnInput>,
) -> Result<Json<Value>, ApiError> {
    reply(state.wallet().burn(&input).await)
}

/// Universe stats, daemon info and per-asset stats
pub async fn get_network(State(state): State<Arc<AppState>>) -> Json<NetworkOverview> {
    Json(state.wallet().network_overview().await)
}
