//! Wallet views and actions: portfolio, addresses, sends, transfers, burns
//! and network information.
//!
//! Each operation is a thin pass-through to the gateway with the local input
//! checks a user-facing form needs.

mod service;
mod types;

pub use service::{receive_amount, Wallet, BURN_CONFIRMATION};
pub use types::{BurnInput, Holding, NetworkOverview, Portfolio, WalletError};
