//! Daemon tools beyond the wallet: proof export/verify/decode, RFQ offers and
//! quotes, universe federation and sync, key derivation and ownership proofs.
//!
//! Like the wallet, these are pass-throughs with the input checks the forms
//! need. Operations that name an owned asset look it up first to find its
//! script key and anchor outpoint.

mod service;
mod types;

pub use service::{
    parse_anchor_outpoint, Explorer, DEFAULT_KEY_FAMILY, DEFAULT_MAX_UNITS,
    DEFAULT_UNIVERSE_HOST,
};
pub use types::{ExplorerError, SyncInput};
