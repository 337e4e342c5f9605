//! Mint wizard orchestrator implementation.
//!
//! Drives the remote mint-batch lifecycle through two local stages:
//! - **Create**: the user fills in a `MintRequest`; `submit` sends it
//! - **Finalize**: the batch exists remotely; `finalize` or `cancel` ends it
//!
//! The gateway owns the real batch state. The orchestrator only keeps a
//! snapshot of it, replaced by a background poll and by a short delayed
//! refresh after each successful action.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::MintConfig;
use crate::gateway::{
    FinalizeBatchRequest, FundBatchRequest, Gateway, GatewayError, MintAssetRequest,
};

use super::fee::{effective_finalize_fee_rate, effective_fund_fee_rate};
use super::scheduler::{ScheduledTask, Scheduler};
use super::types::{BatchSnapshot, MintError, MintRequest, MintStatus, Stage};

/// Wizard state visible to the user.
#[derive(Debug, Default)]
struct WizardState {
    stage: Stage,
    request: MintRequest,
    last_error: Option<String>,
}

impl WizardState {
    fn check_stage(&mut self, expected: Stage) -> Result<(), MintError> {
        if self.stage != expected {
            let err = MintError::InvalidStage {
                expected,
                actual: self.stage,
            };
            self.last_error = Some(err.to_string());
            return Err(err);
        }
        Ok(())
    }
}

/// Fetches the batch list into the shared snapshot.
///
/// Cloned into background tasks; holds no reference back to the orchestrator.
#[derive(Clone)]
struct BatchRefresher {
    gateway: Arc<dyn Gateway>,
    snapshot: Arc<RwLock<BatchSnapshot>>,
}

impl BatchRefresher {
    async fn refresh(&self) -> Result<BatchSnapshot, GatewayError> {
        let batches = self.gateway.list_batches().await?;
        let snapshot = BatchSnapshot::new(batches);
        *self.snapshot.write().await = snapshot.clone();
        debug!(batches = snapshot.batches.len(), "Batch snapshot replaced");
        Ok(snapshot)
    }

    /// Refresh, logging failures instead of reporting them.
    async fn refresh_quietly(&self, reason: &'static str) {
        if let Err(e) = self.refresh().await {
            warn!(reason = reason, error = %e, "Batch refresh failed");
        }
    }
}

/// Clears the in-flight flag when an action ends, including when its future
/// is dropped mid-call.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The mint orchestrator - owns the wizard stage, the pending request and
/// the batch snapshot.
pub struct MintOrchestrator {
    config: MintConfig,
    gateway: Arc<dyn Gateway>,
    refresher: BatchRefresher,
    wizard: RwLock<WizardState>,
    in_flight: AtomicBool,
    running: AtomicBool,
    scheduler: Scheduler,
}

impl MintOrchestrator {
    /// Create a new orchestrator in the `Create` stage with an empty snapshot.
    pub fn new(config: MintConfig, gateway: Arc<dyn Gateway>) -> Self {
        let refresher = BatchRefresher {
            gateway: Arc::clone(&gateway),
            snapshot: Arc::new(RwLock::new(BatchSnapshot::default())),
        };

        Self {
            config,
            gateway,
            refresher,
            wizard: RwLock::new(WizardState::default()),
            in_flight: AtomicBool::new(false),
            running: AtomicBool::new(false),
            scheduler: Scheduler::new(),
        }
    }

    /// Start background work: an immediate initial load and the periodic poll.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Mint orchestrator already running");
            return;
        }

        info!(
            poll_interval_ms = self.config.poll_interval_ms,
            gateway = self.gateway.name(),
            "Starting mint orchestrator"
        );

        let refresher = self.refresher.clone();
        self.scheduler.schedule(ScheduledTask::after(
            "initial-load",
            Duration::ZERO,
            async move { refresher.refresh_quietly("initial load").await },
        ));

        let refresher = self.refresher.clone();
        self.scheduler.schedule(ScheduledTask::every(
            "batch-poll",
            Duration::from_millis(self.config.poll_interval_ms),
            move || {
                let refresher = refresher.clone();
                async move { refresher.refresh_quietly("poll").await }
            },
        ));
    }

    /// Stop the poll and drop any pending delayed refresh.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Mint orchestrator not running");
            return;
        }

        info!("Stopping mint orchestrator");
        self.scheduler.cancel_all();
        info!("Mint orchestrator stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Names of background tasks that are still pending.
    pub fn scheduled_tasks(&self) -> Vec<&'static str> {
        self.scheduler.active()
    }

    pub async fn stage(&self) -> Stage {
        self.wizard.read().await.stage
    }

    pub async fn request(&self) -> MintRequest {
        self.wizard.read().await.request.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.wizard.read().await.last_error.clone()
    }

    /// Current batch snapshot (possibly stale).
    pub async fn snapshot(&self) -> BatchSnapshot {
        self.refresher.snapshot.read().await.clone()
    }

    /// Fetch the batch list now and replace the snapshot.
    pub async fn refresh(&self) -> Result<BatchSnapshot, MintError> {
        Ok(self.refresher.refresh().await?)
    }

    /// Everything needed to render the wizard.
    pub async fn status(&self) -> MintStatus {
        let snapshot = self.snapshot().await;
        let wizard = self.wizard.read().await;

        MintStatus {
            running: self.is_running(),
            stage: wizard.stage,
            request: wizard.request.clone(),
            in_flight: self.in_flight.load(Ordering::SeqCst),
            last_error: wizard.last_error.clone(),
            pending_batch: snapshot.pending_batch().cloned(),
            funded_batch: snapshot.funded_batch().cloned(),
            finalized_batches: snapshot.finalized_batches().into_iter().cloned().collect(),
            snapshot,
        }
    }

    /// Submit a mint request (`Create` → `Finalize`).
    ///
    /// The request is kept as the wizard's form contents whether or not it
    /// validates. Validation failures never reach the gateway.
    pub async fn submit(&self, request: MintRequest) -> Result<Value, MintError> {
        let _in_flight = self.begin()?;

        let asset = {
            let mut wizard = self.wizard.write().await;
            wizard.check_stage(Stage::Create)?;
            wizard.request = request;
            match wizard.request.to_new_asset() {
                Ok(asset) => {
                    wizard.last_error = None;
                    asset
                }
                Err(e) => {
                    debug!(error = %e, "Mint request rejected locally");
                    wizard.last_error = Some(e.to_string());
                    return Err(e);
                }
            }
        };

        info!(
            name = %asset.name,
            asset_type = asset.asset_type.as_str(),
            amount = %asset.amount,
            "Submitting mint request"
        );

        let result = self
            .gateway
            .mint_asset(&MintAssetRequest {
                asset,
                short_response: true,
            })
            .await;

        let response = self
            .complete(result, |wizard| wizard.stage = Stage::Finalize)
            .await?;

        info!("Mint request accepted, wizard moved to finalize");
        self.schedule_refresh("after submit");
        Ok(response)
    }

    /// Finalize the pending batch (`Finalize` → `Create`).
    ///
    /// The snapshot is refreshed first. When it shows a funded batch the fee
    /// rate is left out of the request; otherwise the effective rate from
    /// `effective_finalize_fee_rate` is sent.
    pub async fn finalize(&self, fee_rate: Option<u64>) -> Result<Value, MintError> {
        let _in_flight = self.begin()?;
        self.enter(Stage::Finalize).await?;

        let snapshot = match self.refresher.refresh().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Refresh before finalize failed, using last snapshot");
                self.snapshot().await
            }
        };

        let fee_rate = if snapshot.has_funded_payload() {
            debug!("Batch already funded, omitting fee rate");
            None
        } else {
            Some(effective_finalize_fee_rate(fee_rate))
        };

        info!(fee_rate = ?fee_rate, "Finalizing mint batch");

        let result = self
            .gateway
            .finalize_batch(&FinalizeBatchRequest {
                short_response: true,
                fee_rate,
            })
            .await;

        let response = self
            .complete(result, |wizard| {
                wizard.stage = Stage::Create;
                wizard.request.clear();
            })
            .await?;

        info!("Mint batch finalized, wizard reset");
        self.schedule_refresh("after finalize");
        Ok(response)
    }

    /// Fund the pending batch without finalizing it. The stage is unchanged.
    pub async fn fund(&self, fee_rate: Option<u64>) -> Result<Value, MintError> {
        let _in_flight = self.begin()?;
        self.enter(Stage::Finalize).await?;

        let fee_rate = effective_fund_fee_rate(fee_rate);
        info!(fee_rate = fee_rate, "Funding mint batch");

        let result = self
            .gateway
            .fund_batch(&FundBatchRequest {
                short_response: true,
                fee_rate,
            })
            .await;

        let response = self.complete(result, |_| {}).await?;

        self.schedule_refresh("after fund");
        Ok(response)
    }

    /// Cancel the pending batch (`Finalize` → `Create`).
    pub async fn cancel(&self) -> Result<Value, MintError> {
        let _in_flight = self.begin()?;
        self.enter(Stage::Finalize).await?;

        info!("Cancelling mint batch");

        let result = self.gateway.cancel_batch().await;

        let response = self
            .complete(result, |wizard| {
                wizard.stage = Stage::Create;
                wizard.request.clear();
            })
            .await?;

        info!("Mint batch cancelled, wizard reset");
        self.schedule_refresh("after cancel");
        Ok(response)
    }

    /// Claim the single user-action slot.
    fn begin(&self) -> Result<InFlight<'_>, MintError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| MintError::Busy)
    }

    /// Check the stage and clear the previous error.
    async fn enter(&self, expected: Stage) -> Result<(), MintError> {
        let mut wizard = self.wizard.write().await;
        wizard.check_stage(expected)?;
        wizard.last_error = None;
        Ok(())
    }

    /// Apply a gateway result: transition on success, record the message on
    /// failure.
    async fn complete<F>(
        &self,
        result: Result<Value, GatewayError>,
        on_success: F,
    ) -> Result<Value, MintError>
    where
        F: FnOnce(&mut WizardState),
    {
        let mut wizard = self.wizard.write().await;
        match result {
            Ok(response) => {
                on_success(&mut wizard);
                Ok(response)
            }
            Err(e) => {
                warn!(stage = %wizard.stage, error = %e, "Mint action failed");
                let err = MintError::from(e);
                wizard.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn schedule_refresh(&self, reason: &'static str) {
        if !self.is_running() {
            debug!(reason, "Orchestrator stopped, skipping delayed refresh");
            return;
        }

        let refresher = self.refresher.clone();
        self.scheduler.schedule(ScheduledTask::after(
            "delayed-refresh",
            Duration::from_millis(self.config.refresh_delay_ms),
            async move { refresher.refresh_quietly(reason).await },
        ));
    }
}
