use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{explorer, handlers, mint, wallet};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Mint wizard
        .route("/mint", get(mint::get_status))
        .route("/mint/submit", post(mint::submit))
        .route("/mint/fund", post(mint::fund))
        .route("/mint/finalize", post(mint::finalize))
        .route("/mint/cancel", post(mint::cancel))
        .route("/mint/refresh", post(mint::refresh))
        // Wallet
        .route("/assets", get(wallet::get_portfolio))
        .route(
            "/addresses",
            get(wallet::list_addresses).post(wallet::create_address),
        )
        .route("/send", post(wallet::send))
        .route("/transfers", get(wallet::list_transfers))
        .route("/burns", get(wallet::list_burns).post(wallet::burn))
        .route("/network", get(wallet::get_network))
        // Proofs
        .route("/proofs/export", post(explorer::export_proof))
        .route("/proofs/verify", post(explorer::verify_proof))
        .route("/proofs/decode", post(explorer::decode_proof))
        // RFQ
        .route("/rfq/buy", post(explorer::buy_offer))
        .route("/rfq/sell", post(explorer::sell_offer))
        .route("/rfq/quotes", get(explorer::list_quotes))
        // Universe
        .route(
            "/universe/federation",
            get(explorer::list_federation).post(explorer::add_federation_server),
        )
        .route("/universe/sync", post(explorer::sync_universe))
        .route("/universe/roots", get(explorer::universe_roots))
        // Keys and ownership
        .route("/keys/internal", post(explorer::next_internal_key))
        .route("/keys/script", post(explorer::next_script_key))
        .route("/ownership/prove", post(explorer::prove_ownership))
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
