//! Explorer API handlers: proofs, RFQ, universe federation, keys, ownership.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tapdash_core::explorer::SyncInput;
use tapdash_core::gateway::{
    FederationServer, OfferSide, PeerAcceptedQuotes, ProofFile, SyncResponse,
};
use tapdash_core::ExplorerError;

use super::handlers::{explorer_error, ApiError};
use super::wallet::string_or_number;
use crate::metrics::record_explorer_error;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AssetBody {
    #[serde(default)]
    pub asset_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DecodeBody {
    #[serde(default)]
    pub raw_proof: String,
}

#[derive(Debug, Deserialize)]
pub struct OfferBody {
    #[serde(default)]
    pub asset_id: String,
    /// Blank means 1000.
    #[serde(default, deserialize_with = "string_or_number")]
    pub max_units: String,
}

#[derive(Debug, Serialize)]
pub struct QuotesResponse {
    #[serde(flatten)]
    pub quotes: PeerAcceptedQuotes,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct FederationListResponse {
    pub servers: Vec<FederationServer>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct FederationBody {
    #[serde(default)]
    pub host: String,
}

#[derive(Debug, Deserialize)]
pub struct KeyBody {
    #[serde(default)]
    pub key_family: Option<u32>,
}

fn reply<T>(result: Result<T, ExplorerError>) -> Result<Json<T>, ApiError> {
    result.map(Json).map_err(|e| {
        record_explorer_error(&e);
        explorer_error(e)
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Export the proof file of an owned asset
pub async fn export_proof(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssetBody>,
) -> Result<Json<ProofFile>, ApiError> {
    reply(state.explorer().export_proof(&body.asset_id).await)
}

/// Verify an exported proof file
pub async fn verify_proof(
    State(state): State<Arc<AppState>>,
    Json(proof): Json<ProofFile>,
) -> Result<Json<Value>, ApiError> {
    reply(state.explorer().verify_proof(&proof).await)
}

pub async fn decode_proof(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DecodeBody>,
) -> Result<Json<Value>, ApiError> {
    reply(state.explorer().decode_proof(&body.raw_proof).await)
}

pub async fn buy_offer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OfferBody>,
) -> Result<Json<Value>, ApiError> {
    reply(
        state
            .explorer()
            .create_offer(OfferSide::Buy, &body.asset_id, &body.max_units)
            .await,
    )
}

pub async fn sell_offer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OfferBody>,
) -> Result<Json<Value>, ApiError> {
    reply(
        state
            .explorer()
            .create_offer(OfferSide::Sell, &body.asset_id, &body.max_units)
            .await,
    )
}

/// Quotes peers have accepted
pub async fn list_quotes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QuotesResponse>, ApiError> {
    reply(state.explorer().peer_quotes().await.map(|quotes| {
        let count = quotes.buy_quotes.len() + quotes.sell_quotes.len();
        QuotesResponse { quotes, count }
    }))
}

pub async fn list_federation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FederationListResponse>, ApiError> {
    reply(state.explorer().federation_servers().await.map(|servers| {
        let count = servers.len();
        FederationListResponse { servers, count }
    }))
}

pub async fn add_federation_server(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FederationBody>,
) -> Result<Json<Value>, ApiError> {
    reply(state.explorer().add_federation_server(&body.host).await)
}

/// Sync with a universe server
pub async fn sync_universe(
    State(state): State<Arc<AppState>>,
    Json(input): Json<SyncInput>,
) -> Result<Json<SyncResponse>, ApiError> {
    reply(state.explorer().sync_universe(&input).await)
}

pub async fn universe_roots(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    reply(state.explorer().universe_roots().await)
}

pub async fn next_internal_key(
    State(state): State<Arc<AppState>>,
    Json(body): Json<KeyBody>,
) -> Result<Json<Value>, ApiError> {
    reply(state.explorer().next_internal_key(body.key_family).await)
}

pub async fn next_script_key(
    State(state): State<Arc<AppState>>,
    Json(body): Json<KeyBody>,
) -> Result<Json<Value>, ApiError> {
    reply(state.explorer().next_script_key(body.key_family).await)
}

/// Prove ownership of an owned asset
pub async fn prove_ownership(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssetBody>,
) -> Result<Json<Value>, ApiError> {
    reply(state.explorer().prove_ownership(&body.asset_id).await)
}
