//! Mint orchestrator for the asset-minting wizard.
//!
//! The orchestrator walks a user through one batch at a time:
//! - **Create**: validate the form and add the asset to the pending batch
//! - **Finalize**: fund and broadcast the batch, or cancel it
//!
//! Batch state lives on the gateway; the orchestrator polls it and refreshes
//! shortly after every successful action.

mod fee;
mod orchestrator;
mod scheduler;
mod types;

pub use fee::{
    effective_finalize_fee_rate, effective_fund_fee_rate, parse_fee_rate,
    DEFAULT_FINALIZE_FEE_RATE, DEFAULT_FUND_FEE_RATE, DEFAULT_SEND_FEE_RATE, MIN_FEE_RATE,
};
pub use orchestrator::MintOrchestrator;
pub use scheduler::{ScheduledTask, Scheduler};
pub use types::{BatchSnapshot, MintError, MintRequest, MintStatus, Stage};
