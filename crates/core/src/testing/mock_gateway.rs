//! Mock gateway for testing.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::gateway::{
    AddFederationServerRequest, Address, Asset, AssetBalance, BatchState, Burn, BurnRequest,
    DaemonInfo, DecodeProofRequest, ExportProofRequest, FederationServer, FinalizeBatchRequest,
    FundBatchRequest, Gateway, GatewayError, MintAssetRequest, MintBatch, NewAddressRequest,
    NextKeyRequest, OfferSide, PeerAcceptedQuotes, ProofFile, ProveOwnershipRequest,
    RfqOfferRequest, SendRequest, SyncRequest, SyncResponse, Transfer, UniverseStats,
    VerifyProofRequest,
};

/// A recorded gateway call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ListBatches,
    MintAsset(MintAssetRequest),
    FundBatch(FundBatchRequest),
    FinalizeBatch(FinalizeBatchRequest),
    CancelBatch,
    ListAssets,
    ListBalances,
    ListAddresses,
    NewAddress(NewAddressRequest),
    Send(SendRequest),
    ListTransfers,
    ListBurns,
    Burn(BurnRequest),
    DaemonInfo,
    UniverseStats,
    AssetStats,
    ExportProof(ExportProofRequest),
    VerifyProof(VerifyProofRequest),
    DecodeProof(DecodeProofRequest),
    AddAssetOffer(OfferSide, RfqOfferRequest),
    PeerAcceptedQuotes,
    ListFederationServers,
    AddFederationServers(AddFederationServerRequest),
    SyncUniverse(SyncRequest),
    UniverseRoots,
    NextInternalKey(NextKeyRequest),
    NextScriptKey(NextKeyRequest),
    ProveOwnership(ProveOwnershipRequest),
}

impl RecordedCall {
    /// Operation name, matching the `Gateway` method.
    pub fn op(&self) -> &'static str {
        match self {
            RecordedCall::ListBatches => "list_batches",
            RecordedCall::MintAsset(_) => "mint_asset",
            RecordedCall::FundBatch(_) => "fund_batch",
            RecordedCall::FinalizeBatch(_) => "finalize_batch",
            RecordedCall::CancelBatch => "cancel_batch",
            RecordedCall::ListAssets => "list_assets",
            RecordedCall::ListBalances => "list_balances",
            RecordedCall::ListAddresses => "list_addresses",
            RecordedCall::NewAddress(_) => "new_address",
            RecordedCall::Send(_) => "send",
            RecordedCall::ListTransfers => "list_transfers",
            RecordedCall::ListBurns => "list_burns",
            RecordedCall::Burn(_) => "burn",
            RecordedCall::DaemonInfo => "daemon_info",
            RecordedCall::UniverseStats => "universe_stats",
            RecordedCall::AssetStats => "asset_stats",
            RecordedCall::ExportProof(_) => "export_proof",
            RecordedCall::VerifyProof(_) => "verify_proof",
            RecordedCall::DecodeProof(_) => "decode_proof",
            RecordedCall::AddAssetOffer(..) => "add_asset_offer",
            RecordedCall::PeerAcceptedQuotes => "peer_accepted_quotes",
            RecordedCall::ListFederationServers => "list_federation_servers",
            RecordedCall::AddFederationServers(_) => "add_federation_servers",
            RecordedCall::SyncUniverse(_) => "sync_universe",
            RecordedCall::UniverseRoots => "universe_roots",
            RecordedCall::NextInternalKey(_) => "next_internal_key",
            RecordedCall::NextScriptKey(_) => "next_script_key",
            RecordedCall::ProveOwnership(_) => "prove_ownership",
        }
    }
}

/// In-memory stand-in for the Taproot Assets daemon behind its gateway.
#[derive(Debug, Default)]
struct MockDaemon {
    batches: Vec<MintBatch>,
    assets: Vec<Asset>,
    balances: BTreeMap<String, AssetBalance>,
    addresses: Vec<Address>,
    transfers: Vec<Transfer>,
    burns: Vec<Burn>,
    daemon_info: DaemonInfo,
    universe_stats: UniverseStats,
    asset_stats: Vec<Value>,
    peer_quotes: PeerAcceptedQuotes,
    federation: Vec<FederationServer>,
    synced_universes: Vec<Value>,
    counter: u32,
}

impl MockDaemon {
    fn next_id(&mut self) -> u32 {
        self.counter += 1;
        self.counter
    }

    fn pending_batch(&mut self) -> Result<&mut MintBatch, GatewayError> {
        self.batches
            .iter_mut()
            .find(|b| b.state.is_pending())
            .ok_or_else(|| GatewayError::Application {
                code: 2,
                message: "no pending batch".to_string(),
            })
    }

    fn holds_asset(&self, asset_id: &str) -> bool {
        self.assets.iter().any(|a| {
            a.asset_id
                .as_deref()
                .or_else(|| a.asset_genesis.as_ref().and_then(|g| g.asset_id.as_deref()))
                == Some(asset_id)
        })
    }
}

/// Mock implementation of the Gateway trait.
///
/// Behaves like a small daemon: minting adds to a pending batch (creating one
/// if needed), funding attaches a payload, finalize broadcasts and cancel
/// cancels. Also provides:
/// - Recorded calls for assertions
/// - One-shot and per-operation error injection
/// - A fixed delay on every call
///
/// # Example
///
/// ```rust,ignore
/// let gateway = MockGateway::new();
/// gateway.mint_asset(&request).await?;
/// assert_eq!(gateway.count("mint_asset").await, 1);
///
/// gateway.set_next_error(GatewayError::Timeout).await;
/// assert!(gateway.list_batches().await.is_err());
/// ```
#[derive(Debug)]
pub struct MockGateway {
    daemon: Arc<RwLock<MockDaemon>>,
    /// Recorded calls, in order.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// If set, the next call (of any kind) fails with this error.
    next_error: Arc<RwLock<Option<GatewayError>>>,
    /// Operations that fail every time until cleared.
    failures: Arc<RwLock<HashMap<&'static str, GatewayError>>>,
    /// Applied before every response.
    delay: Arc<RwLock<Option<Duration>>>,
    healthy: Arc<RwLock<bool>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Create a new mock with no batches or assets.
    pub fn new() -> Self {
        Self {
            daemon: Arc::new(RwLock::new(MockDaemon {
                daemon_info: DaemonInfo {
                    version: Some("0.6.0-mock".to_string()),
                    lnd_version: Some("0.18.0-beta".to_string()),
                    network: Some("regtest".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            })),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failures: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(None)),
            healthy: Arc::new(RwLock::new(true)),
        }
    }

    pub async fn set_batches(&self, batches: Vec<MintBatch>) {
        self.daemon.write().await.batches = batches;
    }

    pub async fn batches(&self) -> Vec<MintBatch> {
        self.daemon.read().await.batches.clone()
    }

    pub async fn set_assets(&self, assets: Vec<Asset>) {
        self.daemon.write().await.assets = assets;
    }

    pub async fn set_balances(&self, balances: Vec<AssetBalance>) {
        self.daemon.write().await.balances = balances
            .into_iter()
            .map(|b| (b.asset_id.clone(), b))
            .collect();
    }

    pub async fn set_addresses(&self, addresses: Vec<Address>) {
        self.daemon.write().await.addresses = addresses;
    }

    pub async fn set_transfers(&self, transfers: Vec<Transfer>) {
        self.daemon.write().await.transfers = transfers;
    }

    pub async fn set_burns(&self, burns: Vec<Burn>) {
        self.daemon.write().await.burns = burns;
    }

    pub async fn burns(&self) -> Vec<Burn> {
        self.daemon.read().await.burns.clone()
    }

    pub async fn set_universe_stats(&self, stats: UniverseStats) {
        self.daemon.write().await.universe_stats = stats;
    }

    pub async fn set_asset_stats(&self, stats: Vec<Value>) {
        self.daemon.write().await.asset_stats = stats;
    }

    pub async fn set_peer_quotes(&self, quotes: PeerAcceptedQuotes) {
        self.daemon.write().await.peer_quotes = quotes;
    }

    pub async fn set_federation_servers(&self, servers: Vec<FederationServer>) {
        self.daemon.write().await.federation = servers;
    }

    pub async fn federation_servers(&self) -> Vec<FederationServer> {
        self.daemon.read().await.federation.clone()
    }

    /// What the next universe sync reports as synced.
    pub async fn set_synced_universes(&self, universes: Vec<Value>) {
        self.daemon.write().await.synced_universes = universes;
    }

    pub async fn set_healthy(&self, healthy: bool) {
        *self.healthy.write().await = healthy;
    }

    /// Make the next call fail.
    pub async fn set_next_error(&self, error: GatewayError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Make every call to `op` fail until `clear_failures`.
    pub async fn fail_operation(&self, op: &'static str, error: GatewayError) {
        self.failures.write().await.insert(op, error);
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Delay every response by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// All recorded calls, oldest first.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Number of recorded calls to `op`.
    pub async fn count(&self, op: &str) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    /// Record the call, wait out the delay, then apply injected errors.
    async fn enter(&self, call: RecordedCall) -> Result<(), GatewayError> {
        let op = call.op();
        self.calls.write().await.push(call);

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(err) = self.failures.read().await.get(op) {
            return Err(err.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn health(&self) -> bool {
        *self.healthy.read().await
    }

    async fn list_batches(&self) -> Result<Vec<MintBatch>, GatewayError> {
        self.enter(RecordedCall::ListBatches).await?;
        Ok(self.daemon.read().await.batches.clone())
    }

    async fn mint_asset(&self, request: &MintAssetRequest) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::MintAsset(request.clone())).await?;

        let mut daemon = self.daemon.write().await;
        if !daemon.batches.iter().any(|b| b.state.is_pending()) {
            let id = daemon.next_id();
            daemon.batches.push(MintBatch {
                batch_key: Some(format!("02{:064x}", id)),
                state: BatchState::Pending,
                ..Default::default()
            });
        }
        let batch = daemon.pending_batch()?;
        batch.assets.push(json!({
            "asset_type": request.asset.asset_type.as_str(),
            "name": request.asset.name,
            "amount": request.asset.amount,
        }));
        Ok(json!({ "pending_batch": batch }))
    }

    async fn fund_batch(&self, request: &FundBatchRequest) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::FundBatch(request.clone())).await?;

        let mut daemon = self.daemon.write().await;
        let batch = daemon.pending_batch()?;
        batch.batch_psbt = Some("cHNidP8BAF4CAAAAAQ==".to_string());
        Ok(json!({ "batch": batch }))
    }

    async fn finalize_batch(
        &self,
        request: &FinalizeBatchRequest,
    ) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::FinalizeBatch(request.clone())).await?;

        let mut daemon = self.daemon.write().await;
        let id = daemon.next_id();
        let batch = daemon.pending_batch()?;
        if batch.has_funded_payload() && request.fee_rate.is_some() {
            return Err(GatewayError::Application {
                code: 2,
                message: "cannot specify fee rate for a funded batch".to_string(),
            });
        }
        batch.state = BatchState::Broadcast;
        batch.batch_txid = Some(format!("{:064x}", id));
        Ok(json!({ "batch": batch }))
    }

    async fn cancel_batch(&self) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::CancelBatch).await?;

        let mut daemon = self.daemon.write().await;
        let batch = daemon.pending_batch()?;
        batch.state = if batch.has_funded_payload() {
            BatchState::SproutCancelled
        } else {
            BatchState::SeedlingCancelled
        };
        Ok(json!({ "batch_key": batch.batch_key }))
    }

    async fn list_assets(&self) -> Result<Vec<Asset>, GatewayError> {
        self.enter(RecordedCall::ListAssets).await?;
        Ok(self.daemon.read().await.assets.clone())
    }

    async fn list_balances(&self) -> Result<BTreeMap<String, AssetBalance>, GatewayError> {
        self.enter(RecordedCall::ListBalances).await?;
        Ok(self.daemon.read().await.balances.clone())
    }

    async fn list_addresses(&self) -> Result<Vec<Address>, GatewayError> {
        self.enter(RecordedCall::ListAddresses).await?;
        Ok(self.daemon.read().await.addresses.clone())
    }

    async fn new_address(&self, request: &NewAddressRequest) -> Result<Address, GatewayError> {
        self.enter(RecordedCall::NewAddress(request.clone())).await?;

        let mut daemon = self.daemon.write().await;
        let id = daemon.next_id();
        let address = Address {
            encoded: Some(format!("taprt1mockaddr{:04}", id)),
            asset_id: Some(request.asset_id.clone()),
            amount: Some(request.amt.clone()),
        };
        daemon.addresses.push(address.clone());
        Ok(address)
    }

    async fn send(&self, request: &SendRequest) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::Send(request.clone())).await?;

        let mut daemon = self.daemon.write().await;
        let id = daemon.next_id();
        let transfer = Transfer {
            anchor_tx_hash: Some(format!("{:064x}", id)),
            ..Default::default()
        };
        daemon.transfers.push(transfer.clone());
        Ok(json!({ "transfer": transfer }))
    }

    async fn list_transfers(&self) -> Result<Vec<Transfer>, GatewayError> {
        self.enter(RecordedCall::ListTransfers).await?;
        Ok(self.daemon.read().await.transfers.clone())
    }

    async fn list_burns(&self) -> Result<Vec<Burn>, GatewayError> {
        self.enter(RecordedCall::ListBurns).await?;
        Ok(self.daemon.read().await.burns.clone())
    }

    async fn burn(&self, request: &BurnRequest) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::Burn(request.clone())).await?;

        let mut daemon = self.daemon.write().await;
        let id = daemon.next_id();
        let burn = Burn {
            asset_id: Some(request.asset_id.clone()),
            amount: Some(request.amount_to_burn.clone()),
            anchor_txid: Some(format!("{:064x}", id)),
            note: request.note.clone(),
            tweaked_group_key: None,
        };
        daemon.burns.push(burn);
        Ok(json!({ "burn_transfer": {}, "burn_proof": {} }))
    }

    async fn daemon_info(&self) -> Result<DaemonInfo, GatewayError> {
        self.enter(RecordedCall::DaemonInfo).await?;
        Ok(self.daemon.read().await.daemon_info.clone())
    }

    async fn universe_stats(&self) -> Result<UniverseStats, GatewayError> {
        self.enter(RecordedCall::UniverseStats).await?;
        Ok(self.daemon.read().await.universe_stats.clone())
    }

    async fn asset_stats(&self) -> Result<Vec<Value>, GatewayError> {
        self.enter(RecordedCall::AssetStats).await?;
        Ok(self.daemon.read().await.asset_stats.clone())
    }

    async fn export_proof(&self, request: &ExportProofRequest) -> Result<ProofFile, GatewayError> {
        self.enter(RecordedCall::ExportProof(request.clone())).await?;

        let mut daemon = self.daemon.write().await;
        if !daemon.holds_asset(&request.asset_id) {
            return Err(GatewayError::Application {
                code: 2,
                message: "unable to fetch proof: proof not found".to_string(),
            });
        }
        let id = daemon.next_id();
        Ok(ProofFile {
            raw_proof_file: format!("VEFQRgAB{:08}", id),
            genesis_point: format!("{:064x}:0", id),
        })
    }

    async fn verify_proof(&self, request: &VerifyProofRequest) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::VerifyProof(request.clone())).await?;

        if request.raw_proof_file.is_empty() {
            return Err(GatewayError::Application {
                code: 2,
                message: "invalid proof file".to_string(),
            });
        }
        Ok(json!({
            "valid": true,
            "decoded_proof": { "genesis_point": request.genesis_point },
        }))
    }

    async fn decode_proof(&self, request: &DecodeProofRequest) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::DecodeProof(request.clone())).await?;
        Ok(json!({
            "decoded_proof": {
                "proof_at_depth": request.proof_at_depth,
                "number_of_proofs": 1,
                "asset": {},
            }
        }))
    }

    async fn add_asset_offer(
        &self,
        side: OfferSide,
        request: &RfqOfferRequest,
    ) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::AddAssetOffer(side, request.clone()))
            .await?;
        Ok(json!({}))
    }

    async fn peer_accepted_quotes(&self) -> Result<PeerAcceptedQuotes, GatewayError> {
        self.enter(RecordedCall::PeerAcceptedQuotes).await?;
        Ok(self.daemon.read().await.peer_quotes.clone())
    }

    async fn list_federation_servers(&self) -> Result<Vec<FederationServer>, GatewayError> {
        self.enter(RecordedCall::ListFederationServers).await?;
        Ok(self.daemon.read().await.federation.clone())
    }

    async fn add_federation_servers(
        &self,
        request: &AddFederationServerRequest,
    ) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::AddFederationServers(request.clone()))
            .await?;

        let mut daemon = self.daemon.write().await;
        for server in &request.servers {
            if daemon.federation.iter().any(|s| s.host == server.host) {
                return Err(GatewayError::Application {
                    code: 2,
                    message: format!("server {} already exists", server.host),
                });
            }
            let id = i64::from(daemon.next_id());
            daemon.federation.push(FederationServer {
                host: server.host.clone(),
                id,
            });
        }
        Ok(json!({}))
    }

    async fn sync_universe(&self, request: &SyncRequest) -> Result<SyncResponse, GatewayError> {
        self.enter(RecordedCall::SyncUniverse(request.clone())).await?;
        Ok(SyncResponse {
            synced_universes: self.daemon.read().await.synced_universes.clone(),
        })
    }

    async fn universe_roots(&self) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::UniverseRoots).await?;
        Ok(json!({ "universe_roots": {} }))
    }

    async fn next_internal_key(&self, request: &NextKeyRequest) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::NextInternalKey(*request)).await?;

        let id = self.daemon.write().await.next_id();
        Ok(json!({
            "internal_key": {
                "raw_key_bytes": format!("02{:064x}", id),
                "key_loc": { "key_family": request.key_family, "key_index": id },
            }
        }))
    }

    async fn next_script_key(&self, request: &NextKeyRequest) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::NextScriptKey(*request)).await?;

        let id = self.daemon.write().await.next_id();
        Ok(json!({
            "script_key": {
                "pub_key": format!("03{:064x}", id),
                "key_desc": {
                    "key_loc": { "key_family": request.key_family, "key_index": id },
                },
                "tap_tweak": "",
            }
        }))
    }

    async fn prove_ownership(
        &self,
        request: &ProveOwnershipRequest,
    ) -> Result<Value, GatewayError> {
        self.enter(RecordedCall::ProveOwnership(request.clone()))
            .await?;

        let daemon = self.daemon.read().await;
        if !daemon.holds_asset(&request.asset_id) {
            return Err(GatewayError::Application {
                code: 2,
                message: "asset not owned".to_string(),
            });
        }
        Ok(json!({ "proof_with_witness": "VEFQUAAB" }))
    }
}
