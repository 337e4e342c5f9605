//! Mint wizard API handlers.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tapdash_core::mint::{parse_fee_rate, BatchSnapshot};
use tapdash_core::{MintError, MintRequest, MintStatus, Stage};

use super::handlers::{api_error, mint_error, ApiError};
use crate::metrics::record_mint_action;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Optional fee rate for fund and finalize. Accepts a number or the text a
/// user typed (leading digits are used).
#[derive(Debug, Default, Deserialize)]
pub struct FeeRateBody {
    #[serde(default, deserialize_with = "fee_rate_input")]
    pub fee_rate: Option<u64>,
}

/// Result of a wizard action.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    /// Wizard stage after the action.
    pub stage: Stage,
    /// Gateway response body.
    pub response: Value,
}

fn fee_rate_input<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(parse_fee_rate(&s)),
        Some(Value::Number(n)) => Ok(n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        })),
        Some(other) => Err(serde::de::Error::custom(format!(
            "fee_rate must be a number or string, got {}",
            other
        ))),
    }
}

/// An empty body means no fee rate.
fn parse_fee_body(body: &Bytes) -> Result<Option<u64>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<FeeRateBody>(body)
        .map(|b| b.fee_rate)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e)))
}

async fn respond(
    state: &AppState,
    action: &str,
    result: Result<Value, MintError>,
) -> Result<Json<ActionResponse>, ApiError> {
    record_mint_action(action, &result);
    let response = result.map_err(mint_error)?;
    Ok(Json(ActionResponse {
        stage: state.mint().stage().await,
        response,
    }))
}

// ============================================================================
// Handlers
// ============================================================================

/// Get wizard status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<MintStatus> {
    Json(state.mint().status().await)
}

/// Submit a mint request
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MintRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let result = state.mint().submit(request).await;
    respond(&state, "submit", result).await
}

/// Fund the pending batch
pub async fn fund(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ActionResponse>, ApiError> {
    let fee_rate = parse_fee_body(&body)?;
    let result = state.mint().fund(fee_rate).await;
    respond(&state, "fund", result).await
}

/// Finalize the pending batch
pub async fn finalize(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ActionResponse>, ApiError> {
    let fee_rate = parse_fee_body(&body)?;
    let result = state.mint().finalize(fee_rate).await;
    respond(&state, "finalize", result).await
}

/// Cancel the pending batch
pub async fn cancel(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, ApiError> {
    let result = state.mint().cancel().await;
    respond(&state, "cancel", result).await
}

/// Fetch the batch list now
pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<Json<BatchSnapshot>, ApiError> {
    let result = state.mint().refresh().await;
    record_mint_action("refresh", &result);
    result.map(Json).map_err(mint_error)
}
