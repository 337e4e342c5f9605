//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the tapdash server:
//! - HTTP request metrics (latency, counts)
//! - Mint wizard actions and gateway failures
//! - Orchestrator and gateway status (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use tracing::warn;

use tapdash_core::gateway::{BatchState, GatewayError};
use tapdash_core::{ExplorerError, MintError, Stage, WalletError};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tapdash_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .expect("valid metric definition")
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tapdash_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .expect("valid metric definition")
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "tapdash_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .expect("valid metric definition")
});

// =============================================================================
// Mint Metrics
// =============================================================================

/// Wizard actions by action and outcome (ok, rejected, failed).
pub static MINT_ACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tapdash_mint_actions_total", "Mint wizard actions"),
        &["action", "outcome"],
    )
    .expect("valid metric definition")
});

/// Gateway failures seen by user actions, by kind.
pub static GATEWAY_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tapdash_gateway_failures_total",
            "Gateway call failures surfaced to users",
        ),
        &["kind"],
    )
    .expect("valid metric definition")
});

/// Current wizard stage (0 = create, 1 = finalize). Collected dynamically.
pub static MINT_STAGE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("tapdash_mint_stage", "Current mint wizard stage")
        .expect("valid metric definition")
});

/// Whether the orchestrator's poll is running. Collected dynamically.
pub static MINT_ORCHESTRATOR_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "tapdash_mint_orchestrator_running",
        "Whether the mint orchestrator is running",
    )
    .expect("valid metric definition")
});

/// Batches in the last snapshot, by state. Collected dynamically.
pub static MINT_BATCHES_BY_STATE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("tapdash_mint_batches_by_state", "Mint batches by state"),
        &["state"],
    )
    .expect("valid metric definition")
});

/// Whether the gateway answered its health check. Collected dynamically.
pub static GATEWAY_UP: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("tapdash_gateway_up", "Whether the REST gateway is reachable")
        .expect("valid metric definition")
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // HTTP
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        // Mint
        Box::new(MINT_ACTIONS_TOTAL.clone()),
        Box::new(GATEWAY_FAILURES_TOTAL.clone()),
        Box::new(MINT_STAGE.clone()),
        Box::new(MINT_ORCHESTRATOR_RUNNING.clone()),
        Box::new(MINT_BATCHES_BY_STATE.clone()),
        Box::new(GATEWAY_UP.clone()),
    ];

    for metric in metrics {
        if let Err(e) = registry.register(metric) {
            warn!(error = %e, "Failed to register metric");
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the orchestrator snapshot and
/// the gateway's current reachability.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.mint().status().await;
    MINT_STAGE.set(match status.stage {
        Stage::Create => 0,
        Stage::Finalize => 1,
    });
    MINT_ORCHESTRATOR_RUNNING.set(i64::from(status.running));

    for batch_state in BATCH_STATES {
        MINT_BATCHES_BY_STATE
            .with_label_values(&[batch_state.as_str()])
            .set(0);
    }
    for batch in &status.snapshot.batches {
        MINT_BATCHES_BY_STATE
            .with_label_values(&[batch.state.as_str()])
            .inc();
    }

    GATEWAY_UP.set(i64::from(state.gateway().health().await));
}

/// Record the outcome of a wizard action.
pub fn record_mint_action<T>(action: &str, result: &Result<T, MintError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(MintError::Gateway(e)) => {
            record_gateway_failure(e);
            "failed"
        }
        Err(_) => "rejected",
    };
    MINT_ACTIONS_TOTAL
        .with_label_values(&[action, outcome])
        .inc();
}

/// Record a gateway failure behind a wallet operation, if there was one.
pub fn record_wallet_error(error: &WalletError) {
    if let WalletError::Gateway(e) = error {
        record_gateway_failure(e);
    }
}

pub fn record_explorer_error(error: &ExplorerError) {
    if let ExplorerError::Gateway(e) = error {
        record_gateway_failure(e);
    }
}

fn record_gateway_failure(error: &GatewayError) {
    let kind = match error {
        GatewayError::ConnectionFailed(_) => "connection",
        GatewayError::Timeout => "timeout",
        GatewayError::Request(_) => "request",
        GatewayError::Http { .. } => "http",
        GatewayError::Application { .. } => "application",
        GatewayError::InvalidResponse(_) => "invalid_response",
    };
    GATEWAY_FAILURES_TOTAL.with_label_values(&[kind]).inc();
}

/// Every batch state, so each series exists even at zero.
const BATCH_STATES: [BatchState; 10] = [
    BatchState::Pending,
    BatchState::Frozen,
    BatchState::Committed,
    BatchState::Funded,
    BatchState::Finalized,
    BatchState::Broadcast,
    BatchState::Confirmed,
    BatchState::SeedlingCancelled,
    BatchState::SproutCancelled,
    BatchState::Unknown,
];
