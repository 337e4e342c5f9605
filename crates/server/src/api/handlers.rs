use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tapdash_core::{ExplorerError, MintError, SanitizedConfig, WalletError};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub gateway_connected: bool,
}

/// Error body shared by every API handler.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Validation → 400, stage or busy → 409, gateway → 502.
pub fn mint_error(error: MintError) -> ApiError {
    let status = match &error {
        MintError::Validation(_) => StatusCode::BAD_REQUEST,
        MintError::InvalidStage { .. } | MintError::Busy => StatusCode::CONFLICT,
        MintError::Gateway(_) => StatusCode::BAD_GATEWAY,
    };
    api_error(status, error.to_string())
}

pub fn wallet_error(error: WalletError) -> ApiError {
    let status = match &error {
        WalletError::Validation(_) => StatusCode::BAD_REQUEST,
        WalletError::Gateway(_) => StatusCode::BAD_GATEWAY,
    };
    api_error(status, error.to_string())
}

pub fn explorer_error(error: ExplorerError) -> ApiError {
    let status = match &error {
        ExplorerError::Validation(_) => StatusCode::BAD_REQUEST,
        ExplorerError::Gateway(_) => StatusCode::BAD_GATEWAY,
    };
    api_error(status, error.to_string())
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        gateway_connected: state.wallet().is_connected().await,
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// Prometheus text exposition.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state).await;
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
