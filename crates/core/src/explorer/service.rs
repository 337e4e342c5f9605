//! Explorer operations over the gateway.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use crate::gateway::{
    AddFederationServerRequest, AssetSpecifier, DecodeProofRequest, ExportProofRequest,
    FederationServer, Gateway, NextKeyRequest, OfferSide, OutPoint, PeerAcceptedQuotes,
    ProofFile, ProveOwnershipRequest, RfqOfferRequest, SyncRequest, SyncResponse,
    VerifyProofRequest,
};

use super::types::{ExplorerError, SyncInput};

/// Offer size used when the form is left blank.
pub const DEFAULT_MAX_UNITS: &str = "1000";

/// Universe server synced when no host is given.
pub const DEFAULT_UNIVERSE_HOST: &str = "127.0.0.1:8289";

pub const DEFAULT_KEY_FAMILY: u32 = 1;

const CHALLENGE_PREFIX: &str = "ownership_challenge_";

/// Proofs, RFQ, universe and key tools.
#[derive(Clone)]
pub struct Explorer {
    gateway: Arc<dyn Gateway>,
}

/// Where an owned asset lives on chain.
struct Anchor {
    asset_id: String,
    script_key: Option<String>,
    outpoint: OutPoint,
}

impl Explorer {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Export the proof file of an owned asset.
    pub async fn export_proof(&self, asset_id: &str) -> Result<ProofFile, ExplorerError> {
        let anchor = self.locate(asset_id).await?;
        info!(asset_id = %anchor.asset_id, "Exporting proof");

        let request = ExportProofRequest {
            asset_id: anchor.asset_id,
            script_key: anchor.script_key,
            outpoint: anchor.outpoint,
        };
        Ok(self.gateway.export_proof(&request).await?)
    }

    /// Verify a previously exported proof file.
    pub async fn verify_proof(&self, proof: &ProofFile) -> Result<Value, ExplorerError> {
        if proof.raw_proof_file.is_empty() {
            return Err(ExplorerError::Validation(
                "Please export a proof first".to_string(),
            ));
        }

        let request = VerifyProofRequest {
            raw_proof_file: proof.raw_proof_file.clone(),
            genesis_point: proof.genesis_point.clone(),
        };
        Ok(self.gateway.verify_proof(&request).await?)
    }

    /// Decode the last proof of a file, with witnesses and meta reveal.
    pub async fn decode_proof(&self, raw_proof: &str) -> Result<Value, ExplorerError> {
        if raw_proof.is_empty() {
            return Err(ExplorerError::Validation(
                "Please export a proof first".to_string(),
            ));
        }

        let request = DecodeProofRequest {
            raw_proof: raw_proof.to_string(),
            proof_at_depth: 0,
            with_prev_witnesses: true,
            with_meta_reveal: true,
        };
        Ok(self.gateway.decode_proof(&request).await?)
    }

    /// Register a buy or sell offer. A blank `max_units` means 1000.
    pub async fn create_offer(
        &self,
        side: OfferSide,
        asset_id: &str,
        max_units: &str,
    ) -> Result<Value, ExplorerError> {
        let asset_id = asset_id.trim();
        if asset_id.is_empty() {
            return Err(ExplorerError::Validation(
                "Please select an asset".to_string(),
            ));
        }
        let max_units = offer_units(max_units)?;

        info!(side = side.endpoint(), asset_id, max_units = %max_units, "Creating RFQ offer");
        let request = RfqOfferRequest {
            asset_specifier: AssetSpecifier {
                asset_id_str: asset_id.to_string(),
            },
            max_units,
        };
        Ok(self.gateway.add_asset_offer(side, &request).await?)
    }

    pub async fn peer_quotes(&self) -> Result<PeerAcceptedQuotes, ExplorerError> {
        Ok(self.gateway.peer_accepted_quotes().await?)
    }

    pub async fn federation_servers(&self) -> Result<Vec<FederationServer>, ExplorerError> {
        Ok(self.gateway.list_federation_servers().await?)
    }

    /// Add one server to the universe federation. The daemon assigns its id.
    pub async fn add_federation_server(&self, host: &str) -> Result<Value, ExplorerError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(ExplorerError::Validation(
                "Please enter a server host".to_string(),
            ));
        }

        info!(host, "Adding federation server");
        let request = AddFederationServerRequest {
            servers: vec![FederationServer {
                host: host.to_string(),
                id: 0,
            }],
        };
        Ok(self.gateway.add_federation_servers(&request).await?)
    }

    /// Sync with a universe server; every target it offers.
    pub async fn sync_universe(&self, input: &SyncInput) -> Result<SyncResponse, ExplorerError> {
        let universe_host = input
            .universe_host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_UNIVERSE_HOST);

        let request = SyncRequest {
            universe_host: universe_host.to_string(),
            sync_mode: input.sync_mode,
            sync_targets: Vec::new(),
        };
        let response = self.gateway.sync_universe(&request).await?;
        info!(
            host = universe_host,
            synced = response.synced_universes.len(),
            "Universe sync finished"
        );
        Ok(response)
    }

    pub async fn universe_roots(&self) -> Result<Value, ExplorerError> {
        Ok(self.gateway.universe_roots().await?)
    }

    pub async fn next_internal_key(&self, key_family: Option<u32>) -> Result<Value, ExplorerError> {
        let request = NextKeyRequest {
            key_family: key_family.unwrap_or(DEFAULT_KEY_FAMILY),
        };
        Ok(self.gateway.next_internal_key(&request).await?)
    }

    pub async fn next_script_key(&self, key_family: Option<u32>) -> Result<Value, ExplorerError> {
        let request = NextKeyRequest {
            key_family: key_family.unwrap_or(DEFAULT_KEY_FAMILY),
        };
        Ok(self.gateway.next_script_key(&request).await?)
    }

    /// Prove ownership of an owned asset against a fresh time-based challenge.
    pub async fn prove_ownership(&self, asset_id: &str) -> Result<Value, ExplorerError> {
        let anchor = self.locate(asset_id).await?;
        info!(asset_id = %anchor.asset_id, "Proving asset ownership");

        let challenge = format!("{}{}", CHALLENGE_PREFIX, Utc::now().timestamp_millis());
        let request = ProveOwnershipRequest {
            asset_id: anchor.asset_id,
            script_key: anchor.script_key,
            outpoint: anchor.outpoint,
            challenge: BASE64.encode(challenge),
        };
        Ok(self.gateway.prove_ownership(&request).await?)
    }

    /// Find an owned asset and its anchor outpoint.
    async fn locate(&self, asset_id: &str) -> Result<Anchor, ExplorerError> {
        let asset_id = asset_id.trim();
        if asset_id.is_empty() {
            return Err(ExplorerError::Validation(
                "Please select an asset".to_string(),
            ));
        }

        let assets = self.gateway.list_assets().await?;
        let asset = assets
            .into_iter()
            .find(|a| {
                a.asset_id
                    .as_deref()
                    .or_else(|| a.asset_genesis.as_ref().and_then(|g| g.asset_id.as_deref()))
                    == Some(asset_id)
            })
            .ok_or_else(|| ExplorerError::Validation("Asset not found".to_string()))?;

        let outpoint = asset
            .chain_anchor
            .as_ref()
            .and_then(|c| c.anchor_outpoint.as_deref())
            .and_then(parse_anchor_outpoint)
            .ok_or_else(|| ExplorerError::Validation("Invalid anchor outpoint".to_string()))?;
        debug!(asset_id, output_index = outpoint.output_index, "Asset located");

        Ok(Anchor {
            asset_id: asset_id.to_string(),
            script_key: asset.script_key,
            outpoint,
        })
    }
}

/// Parse `"<txid hex>:<output index>"` into the RPC form, with the txid bytes
/// base64 encoded.
pub fn parse_anchor_outpoint(anchor: &str) -> Option<OutPoint> {
    let mut parts = anchor.split(':');
    let (Some(txid), Some(index), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    if txid.is_empty() {
        return None;
    }

    let bytes = hex::decode(txid).ok()?;
    let output_index = index.trim().parse::<u32>().ok()?;
    Some(OutPoint {
        txid: BASE64.encode(bytes),
        output_index,
    })
}

/// Blank means the default; anything else must be a positive integer.
fn offer_units(input: &str) -> Result<String, ExplorerError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(DEFAULT_MAX_UNITS.to_string());
    }
    match input.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n.to_string()),
        _ => Err(ExplorerError::Validation(
            "Max units must be greater than 0".to_string(),
        )),
    }
}
