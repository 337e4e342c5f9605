//! REST gateway client implementation.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::GatewayConfig;

use super::types::{
    AssetStatsResponse, BalancesResponse, ListAddressesResponse, ListAssetsResponse,
    ListBatchesResponse, ListBurnsResponse, ListFederationServersResponse,
    ListTransfersResponse,
};
use super::{
    AddFederationServerRequest, Address, Asset, AssetBalance, Burn, BurnRequest, DaemonInfo,
    DecodeProofRequest, ExportProofRequest, FederationServer, FinalizeBatchRequest,
    FundBatchRequest, Gateway, GatewayError, MintAssetRequest, MintBatch, NewAddressRequest,
    NextKeyRequest, OfferSide, PeerAcceptedQuotes, ProofFile, ProveOwnershipRequest,
    RfqOfferRequest, SendRequest, SyncRequest, SyncResponse, Transfer, UniverseStats,
    VerifyProofRequest,
};

const API_PREFIX: &str = "/v1/taproot-assets";

/// Gateway client speaking HTTP/JSON to the Taproot Assets REST gateway.
pub struct RestGateway {
    client: Client,
    config: GatewayConfig,
}

impl RestGateway {
    /// Create a new client. No timeout is applied unless configured.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs as u64));
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}{}", self.base_url(), API_PREFIX, endpoint)
    }

    /// Send a request and apply the gateway's error conventions.
    async fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<Value, GatewayError> {
        debug!(endpoint = endpoint, "Gateway request");

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        let result = interpret_response(status, &body);
        if let Err(ref e) = result {
            debug!(endpoint = endpoint, status = status.as_u16(), error = %e, "Gateway call failed");
        }
        result
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, GatewayError> {
        let request = self.client.get(self.api_url(endpoint));
        let value = self.execute(endpoint, request).await?;
        decode(value)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Value, GatewayError> {
        let request = self.client.post(self.api_url(endpoint)).json(body);
        self.execute(endpoint, request).await
    }
}

/// `/rfq/buyoffer/asset-id/<id>` or `/rfq/selloffer/asset-id/<id>`.
fn offer_endpoint(side: OfferSide, asset_id: &str) -> String {
    format!(
        "/rfq/{}/asset-id/{}",
        side.endpoint(),
        urlencoding::encode(asset_id)
    )
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionFailed(e.to_string())
    } else {
        GatewayError::Request(e.to_string())
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value)
        .map_err(|e| GatewayError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

/// Turn a raw gateway response into a JSON payload or an error.
///
/// - non-2xx: `Http`, using the body's `message` (or `error`) when present
/// - 2xx with a non-zero `code` field: `Application`
/// - empty 2xx body: `Value::Null`
pub(crate) fn interpret_response(status: StatusCode, body: &str) -> Result<Value, GatewayError> {
    let parsed: Option<Value> = if body.trim().is_empty() {
        Some(Value::Null)
    } else {
        serde_json::from_str(body).ok()
    };

    if !status.is_success() {
        let message = parsed
            .as_ref()
            .and_then(body_message)
            .unwrap_or_else(|| {
                format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string()
            });
        return Err(GatewayError::Http {
            status: status.as_u16(),
            message,
        });
    }

    let value = parsed.ok_or_else(|| {
        GatewayError::InvalidResponse(format!(
            "Response is not JSON: {}",
            body.chars().take(200).collect::<String>()
        ))
    })?;

    if let Some(code) = error_code(&value) {
        let message =
            body_message(&value).unwrap_or_else(|| format!("Gateway returned error code {}", code));
        return Err(GatewayError::Application { code, message });
    }

    Ok(value)
}

/// Non-zero `code` field, as number or numeric string.
fn error_code(value: &Value) -> Option<i64> {
    let code = match value.get("code")? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (code != 0).then_some(code)
}

fn body_message(value: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Gateway for RestGateway {
    fn name(&self) -> &str {
        "rest"
    }

    async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url());
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Gateway health check failed");
                false
            }
        }
    }

    async fn list_batches(&self) -> Result<Vec<MintBatch>, GatewayError> {
        let response: ListBatchesResponse = self.get("/assets/mint/batches/").await?;
        Ok(response.batches)
    }

    async fn mint_asset(&self, request: &MintAssetRequest) -> Result<Value, GatewayError> {
        self.post("/assets", request).await
    }

    async fn fund_batch(&self, request: &FundBatchRequest) -> Result<Value, GatewayError> {
        self.post("/assets/mint/fund", request).await
    }

    async fn finalize_batch(
        &self,
        request: &FinalizeBatchRequest,
    ) -> Result<Value, GatewayError> {
        self.post("/assets/mint/finalize", request).await
    }

    async fn cancel_batch(&self) -> Result<Value, GatewayError> {
        let endpoint = "/assets/mint/cancel";
        let request = self
            .client
            .post(self.api_url(endpoint))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        self.execute(endpoint, request).await
    }

    async fn list_assets(&self) -> Result<Vec<Asset>, GatewayError> {
        let response: ListAssetsResponse = self.get("/assets").await?;
        Ok(response.assets)
    }

    async fn list_balances(&self) -> Result<BTreeMap<String, AssetBalance>, GatewayError> {
        let response: BalancesResponse = self.get("/assets/balance?asset_id=true").await?;
        Ok(response.asset_balances)
    }

    async fn list_addresses(&self) -> Result<Vec<Address>, GatewayError> {
        let response: ListAddressesResponse = self.get("/addrs").await?;
        Ok(response.addrs)
    }

    async fn new_address(&self, request: &NewAddressRequest) -> Result<Address, GatewayError> {
        let value = self.post("/addrs", request).await?;
        decode(value)
    }

    async fn send(&self, request: &SendRequest) -> Result<Value, GatewayError> {
        self.post("/send", request).await
    }

    async fn list_transfers(&self) -> Result<Vec<Transfer>, GatewayError> {
        let response: ListTransfersResponse = self.get("/assets/transfers").await?;
        Ok(response.transfers)
    }

    async fn list_burns(&self) -> Result<Vec<Burn>, GatewayError> {
        let response: ListBurnsResponse = self.get("/burns").await?;
        Ok(response.burns)
    }

    async fn burn(&self, request: &BurnRequest) -> Result<Value, GatewayError> {
        self.post("/burn", request).await
    }

    async fn daemon_info(&self) -> Result<DaemonInfo, GatewayError> {
        self.get("/getinfo").await
    }

    async fn universe_stats(&self) -> Result<UniverseStats, GatewayError> {
        self.get("/universe/stats").await
    }

    async fn asset_stats(&self) -> Result<Vec<Value>, GatewayError> {
        let response: AssetStatsResponse = self.get("/universe/stats/assets").await?;
        Ok(response.asset_stats)
    }

    async fn export_proof(&self, request: &ExportProofRequest) -> Result<ProofFile, GatewayError> {
        let value = self.post("/proofs/export", request).await?;
        decode(value)
    }

    async fn verify_proof(&self, request: &VerifyProofRequest) -> Result<Value, GatewayError> {
        self.post("/proofs/verify", request).await
    }

    async fn decode_proof(&self, request: &DecodeProofRequest) -> Result<Value, GatewayError> {
        self.post("/proofs/decode", request).await
    }

    async fn add_asset_offer(
        &self,
        side: OfferSide,
        request: &RfqOfferRequest,
    ) -> Result<Value, GatewayError> {
        let endpoint = offer_endpoint(side, &request.asset_specifier.asset_id_str);
        self.post(&endpoint, request).await
    }

    async fn peer_accepted_quotes(&self) -> Result<PeerAcceptedQuotes, GatewayError> {
        self.get("/rfq/quotes/peeraccepted").await
    }

    async fn list_federation_servers(&self) -> Result<Vec<FederationServer>, GatewayError> {
        let response: ListFederationServersResponse = self.get("/universe/federation").await?;
        Ok(response.servers)
    }

    async fn add_federation_servers(
        &self,
        request: &AddFederationServerRequest,
    ) -> Result<Value, GatewayError> {
        self.post("/universe/federation", request).await
    }

    async fn sync_universe(&self, request: &SyncRequest) -> Result<SyncResponse, GatewayError> {
        let value = self.post("/universe/sync", request).await?;
        decode(value)
    }

    async fn universe_roots(&self) -> Result<Value, GatewayError> {
        self.get("/universe/roots").await
    }

    async fn next_internal_key(&self, request: &NextKeyRequest) -> Result<Value, GatewayError> {
        self.post("/wallet/internal-key/next", request).await
    }

    async fn next_script_key(&self, request: &NextKeyRequest) -> Result<Value, GatewayError> {
        self.post("/wallet/script-key/next", request).await
    }

    async fn prove_ownership(
        &self,
        request: &ProveOwnershipRequest,
    ) -> Result<Value, GatewayError> {
        self.post("/wallet/ownership/prove", request).await
    }
}
