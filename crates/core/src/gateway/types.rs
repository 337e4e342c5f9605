//! Types for REST gateway operations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while talking to the gateway.
///
/// The gateway signals failure two ways: a non-2xx status, or a 2xx status
/// whose body carries a non-zero `code`. Both end up here.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(String),

    /// Non-success HTTP status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Success status, failure payload.
    #[error("{message}")]
    Application { code: i64, message: String },

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Message reported by the gateway itself, if the failure carried one.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            GatewayError::Http { message, .. } | GatewayError::Application { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }
}

/// Asset kind accepted by the minting endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    /// Fungible, arbitrary supply.
    #[default]
    Normal,
    /// Non-fungible, supply fixed at one.
    Collectible,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Normal => "NORMAL",
            AssetType::Collectible => "COLLECTIBLE",
        }
    }
}

/// Remote lifecycle label of a mint batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchState {
    #[serde(rename = "BATCH_STATE_PENDING")]
    Pending,
    #[serde(rename = "BATCH_STATE_FROZEN")]
    Frozen,
    #[serde(rename = "BATCH_STATE_COMMITTED")]
    Committed,
    #[serde(rename = "BATCH_STATE_FUNDED")]
    Funded,
    #[serde(rename = "BATCH_STATE_FINALIZED")]
    Finalized,
    #[serde(rename = "BATCH_STATE_BROADCAST")]
    Broadcast,
    #[serde(rename = "BATCH_STATE_CONFIRMED")]
    Confirmed,
    #[serde(rename = "BATCH_STATE_SEEDLING_CANCELLED")]
    SeedlingCancelled,
    #[serde(rename = "BATCH_STATE_SPROUT_CANCELLED")]
    SproutCancelled,
    #[default]
    #[serde(rename = "BATCH_STATE_UNKNOWN")]
    #[serde(other)]
    Unknown,
}

impl BatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchState::Pending => "pending",
            BatchState::Frozen => "frozen",
            BatchState::Committed => "committed",
            BatchState::Funded => "funded",
            BatchState::Finalized => "finalized",
            BatchState::Broadcast => "broadcast",
            BatchState::Confirmed => "confirmed",
            BatchState::SeedlingCancelled => "seedling_cancelled",
            BatchState::SproutCancelled => "sprout_cancelled",
            BatchState::Unknown => "unknown",
        }
    }

    /// Still accepting or holding seedlings.
    pub fn is_pending(&self) -> bool {
        matches!(self, BatchState::Pending | BatchState::Frozen)
    }

    /// Past the point of no return.
    pub fn is_finalized(&self) -> bool {
        matches!(
            self,
            BatchState::Finalized | BatchState::Broadcast | BatchState::Confirmed
        )
    }
}

/// A mint batch as reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MintBatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_txid: Option<String>,
    #[serde(default)]
    pub state: BatchState,
    #[serde(default)]
    pub assets: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_hint: Option<u32>,
    /// Batch transaction payload; only present once the batch is funded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_psbt: Option<String>,
}

impl MintBatch {
    /// A batch counts as funded when it carries a transaction payload,
    /// whatever its state label says.
    pub fn has_funded_payload(&self) -> bool {
        self.batch_psbt.as_deref().is_some_and(|p| !p.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListBatchesResponse {
    #[serde(default)]
    pub batches: Vec<MintBatch>,
}

/// Encoded asset metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMeta {
    /// Base64 of the raw metadata bytes.
    pub data: String,
    #[serde(rename = "type")]
    pub meta_type: String,
}

/// The `asset` object of a create-asset call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAsset {
    pub asset_type: AssetType,
    pub name: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_meta: Option<AssetMeta>,
}

/// Body of `POST /v1/taproot-assets/assets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintAssetRequest {
    pub asset: NewAsset,
    pub short_response: bool,
}

/// Body of `POST /v1/taproot-assets/assets/mint/fund`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundBatchRequest {
    pub short_response: bool,
    pub fee_rate: u64,
}

/// Body of `POST /v1/taproot-assets/assets/mint/finalize`.
///
/// `fee_rate` is left out of the JSON entirely when `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeBatchRequest {
    pub short_response: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_rate: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetGenesis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis_point: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainAnchor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_tx: Option<String>,
    /// `"<txid hex>:<output index>"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_outpoint: Option<String>,
}

/// An asset held by the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_genesis: Option<AssetGenesis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_anchor: Option<ChainAnchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListAssetsResponse {
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// Balance of one asset id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetBalance {
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub balance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_genesis: Option<AssetGenesis>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BalancesResponse {
    #[serde(default)]
    pub asset_balances: BTreeMap<String, AssetBalance>,
}

/// A Taproot Assets receive address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListAddressesResponse {
    #[serde(default)]
    pub addrs: Vec<Address>,
}

/// Body of `POST /v1/taproot-assets/addrs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddressRequest {
    pub asset_id: String,
    pub amt: String,
}

/// Body of `POST /v1/taproot-assets/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    pub tap_addrs: Vec<String>,
    pub fee_rate: u64,
}

/// An outbound or inbound asset transfer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_anchor_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_anchor_point: Option<String>,
    #[serde(default)]
    pub inputs: Vec<Value>,
    #[serde(default)]
    pub outputs: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_tx_height_hint: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_tx_chain_fees: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListTransfersResponse {
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

/// A recorded burn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Burn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweaked_group_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListBurnsResponse {
    #[serde(default)]
    pub burns: Vec<Burn>,
}

/// Body of `POST /v1/taproot-assets/burn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnRequest {
    pub asset_id: String,
    pub amount_to_burn: String,
    pub confirmation_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Universe-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniverseStats {
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub num_total_assets: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub num_total_groups: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub num_total_syncs: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub num_total_proofs: Option<u64>,
}

/// Daemon identity and versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaemonInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lnd_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lnd_identity_pubkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetStatsResponse {
    #[serde(default)]
    pub asset_stats: Vec<Value>,
}

/// A transaction output reference as the daemon's RPCs take it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutPoint {
    /// Base64 of the raw txid bytes.
    pub txid: String,
    pub output_index: u32,
}

/// Body of `POST /v1/taproot-assets/proofs/export`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportProofRequest {
    pub asset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_key: Option<String>,
    pub outpoint: OutPoint,
}

/// An exported proof file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofFile {
    #[serde(default)]
    pub raw_proof_file: String,
    #[serde(default)]
    pub genesis_point: String,
}

/// Body of `POST /v1/taproot-assets/proofs/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyProofRequest {
    pub raw_proof_file: String,
    pub genesis_point: String,
}

/// Body of `POST /v1/taproot-assets/proofs/decode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeProofRequest {
    pub raw_proof: String,
    pub proof_at_depth: u32,
    pub with_prev_witnesses: bool,
    pub with_meta_reveal: bool,
}

/// Which side of an RFQ offer to register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferSide {
    Buy,
    Sell,
}

impl OfferSide {
    /// Path segment of the offer endpoint.
    pub fn endpoint(&self) -> &'static str {
        match self {
            OfferSide::Buy => "buyoffer",
            OfferSide::Sell => "selloffer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpecifier {
    pub asset_id_str: String,
}

/// Body of `POST /v1/taproot-assets/rfq/{buyoffer,selloffer}/asset-id/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfqOfferRequest {
    pub asset_specifier: AssetSpecifier,
    pub max_units: String,
}

/// Quotes accepted by peers, as returned by the daemon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerAcceptedQuotes {
    #[serde(default)]
    pub buy_quotes: Vec<Value>,
    #[serde(default)]
    pub sell_quotes: Vec<Value>,
}

/// A universe federation member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationServer {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListFederationServersResponse {
    #[serde(default)]
    pub servers: Vec<FederationServer>,
}

/// Body of `POST /v1/taproot-assets/universe/federation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddFederationServerRequest {
    pub servers: Vec<FederationServer>,
}

/// How much of a remote universe to pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncMode {
    #[default]
    SyncIssuanceOnly,
    SyncFull,
}

/// Body of `POST /v1/taproot-assets/universe/sync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub universe_host: String,
    pub sync_mode: SyncMode,
    /// Empty means everything the remote has.
    pub sync_targets: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub synced_universes: Vec<Value>,
}

/// Body of the `wallet/internal-key/next` and `wallet/script-key/next` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextKeyRequest {
    pub key_family: u32,
}

/// Body of `POST /v1/taproot-assets/wallet/ownership/prove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProveOwnershipRequest {
    pub asset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_key: Option<String>,
    pub outpoint: OutPoint,
    /// Base64 challenge bytes.
    pub challenge: String,
}

/// 64-bit integers come back as JSON strings from the REST proxy; accept both.
fn opt_u64_from_str_or_num<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("not a u64: {}", n))),
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("not a u64: {:?}", s))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// REST gateway abstraction.
///
/// One method per gateway endpoint the dashboard consumes. Implementations
/// must report both failure conventions (HTTP status and in-body error code)
/// as `Err`.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Implementation name, for logs.
    fn name(&self) -> &str;

    /// Whether the gateway answers its health endpoint.
    async fn health(&self) -> bool;

    async fn list_batches(&self) -> Result<Vec<MintBatch>, GatewayError>;

    async fn mint_asset(&self, request: &MintAssetRequest) -> Result<Value, GatewayError>;

    async fn fund_batch(&self, request: &FundBatchRequest) -> Result<Value, GatewayError>;

    async fn finalize_batch(&self, request: &FinalizeBatchRequest)
        -> Result<Value, GatewayError>;

    async fn cancel_batch(&self) -> Result<Value, GatewayError>;

    async fn list_assets(&self) -> Result<Vec<Asset>, GatewayError>;

    /// Balances keyed by asset id.
    async fn list_balances(&self) -> Result<BTreeMap<String, AssetBalance>, GatewayError>;

    async fn list_addresses(&self) -> Result<Vec<Address>, GatewayError>;

    async fn new_address(&self, request: &NewAddressRequest) -> Result<Address, GatewayError>;

    async fn send(&self, request: &SendRequest) -> Result<Value, GatewayError>;

    async fn list_transfers(&self) -> Result<Vec<Transfer>, GatewayError>;

    async fn list_burns(&self) -> Result<Vec<Burn>, GatewayError>;

    async fn burn(&self, request: &BurnRequest) -> Result<Value, GatewayError>;

    async fn daemon_info(&self) -> Result<DaemonInfo, GatewayError>;

    async fn universe_stats(&self) -> Result<UniverseStats, GatewayError>;

    async fn asset_stats(&self) -> Result<Vec<Value>, GatewayError>;

    async fn export_proof(&self, request: &ExportProofRequest) -> Result<ProofFile, GatewayError>;

    async fn verify_proof(&self, request: &VerifyProofRequest) -> Result<Value, GatewayError>;

    async fn decode_proof(&self, request: &DecodeProofRequest) -> Result<Value, GatewayError>;

    /// Register a buy or sell offer for the asset named in the request.
    async fn add_asset_offer(
        &self,
        side: OfferSide,
        request: &RfqOfferRequest,
    ) -> Result<Value, GatewayError>;

    async fn peer_accepted_quotes(&self) -> Result<PeerAcceptedQuotes, GatewayError>;

    async fn list_federation_servers(&self) -> Result<Vec<FederationServer>, GatewayError>;

    async fn add_federation_servers(
        &self,
        request: &AddFederationServerRequest,
    ) -> Result<Value, GatewayError>;

    async fn sync_universe(&self, request: &SyncRequest) -> Result<SyncResponse, GatewayError>;

    async fn universe_roots(&self) -> Result<Value, GatewayError>;

    async fn next_internal_key(&self, request: &NextKeyRequest) -> Result<Value, GatewayError>;

    async fn next_script_key(&self, request: &NextKeyRequest) -> Result<Value, GatewayError>;

    async fn prove_ownership(&self, request: &ProveOwnershipRequest)
        -> Result<Value, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_state_wire_names() {
        let batch: MintBatch = serde_json::from_value(json!({
            "batch_key": "02abc",
            "state": "BATCH_STATE_FROZEN"
        }))
        .unwrap();
        assert_eq!(batch.state, BatchState::Frozen);
        assert!(batch.state.is_pending());
    }

    #[test]
    fn test_unknown_batch_state_does_not_fail() {
        let batch: MintBatch =
            serde_json::from_value(json!({ "state": "BATCH_STATE_SOMETHING_NEW" })).unwrap();
        assert_eq!(batch.state, BatchState::Unknown);
    }

    #[test]
    fn test_funded_payload_detection() {
        let mut batch = MintBatch::default();
        assert!(!batch.has_funded_payload());

        batch.batch_psbt = Some(String::new());
        assert!(!batch.has_funded_payload());

        batch.batch_psbt = Some("cHNidP8BAH0CAAAAAQ".to_string());
        assert!(batch.has_funded_payload());
    }

    #[test]
    fn test_finalize_request_omits_absent_fee_rate() {
        let body = serde_json::to_value(FinalizeBatchRequest {
            short_response: true,
            fee_rate: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "short_response": true }));

        let body = serde_json::to_value(FinalizeBatchRequest {
            short_response: true,
            fee_rate: Some(2500),
        })
        .unwrap();
        assert_eq!(body["fee_rate"], 2500);
    }

    #[test]
    fn test_mint_request_wire_shape() {
        let request = MintAssetRequest {
            asset: NewAsset {
                asset_type: AssetType::Collectible,
                name: "CoolNFT".to_string(),
                amount: "1".to_string(),
                asset_meta: Some(AssetMeta {
                    data: "aGk=".to_string(),
                    meta_type: "0".to_string(),
                }),
            },
            short_response: true,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["asset"]["asset_type"], "COLLECTIBLE");
        assert_eq!(body["asset"]["amount"], "1");
        assert_eq!(body["asset"]["asset_meta"]["type"], "0");
        assert_eq!(body["short_response"], true);
    }

    #[test]
    fn test_universe_stats_accepts_strings_and_numbers() {
        let stats: UniverseStats = serde_json::from_value(json!({
            "num_total_assets": "42",
            "num_total_groups": 3,
            "num_total_proofs": null
        }))
        .unwrap();
        assert_eq!(stats.num_total_assets, Some(42));
        assert_eq!(stats.num_total_groups, Some(3));
        assert_eq!(stats.num_total_syncs, None);
        assert_eq!(stats.num_total_proofs, None);
    }

    #[test]
    fn test_sync_request_wire_shape() {
        let body = serde_json::to_value(SyncRequest {
            universe_host: "127.0.0.1:8289".to_string(),
            sync_mode: SyncMode::default(),
            sync_targets: vec![],
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "universe_host": "127.0.0.1:8289",
                "sync_mode": "SYNC_ISSUANCE_ONLY",
                "sync_targets": []
            })
        );
        assert_eq!(
            serde_json::to_value(SyncMode::SyncFull).unwrap(),
            "SYNC_FULL"
        );
    }

    #[test]
    fn test_anchor_outpoint_is_read() {
        let asset: Asset = serde_json::from_value(json!({
            "asset_id": "aa",
            "chain_anchor": { "anchor_outpoint": "00ff:1", "block_height": 120 }
        }))
        .unwrap();
        let anchor = asset.chain_anchor.unwrap();
        assert_eq!(anchor.anchor_outpoint.as_deref(), Some("00ff:1"));
        assert_eq!(anchor.block_height, Some(120));
    }

    #[test]
    fn test_error_display_uses_remote_message() {
        let err = GatewayError::Application {
            code: 5,
            message: "insufficient funds".to_string(),
        };
        assert_eq!(err.to_string(), "insufficient funds");
        assert_eq!(err.remote_message(), Some("insufficient funds"));
        assert_eq!(GatewayError::Timeout.remote_message(), None);
    }
}
