//! Types for explorer operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::{GatewayError, SyncMode};

/// Errors that can occur during an explorer operation.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Local input check failed; nothing was sent.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

/// Universe sync parameters. A blank host means the local universe server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncInput {
    #[serde(default)]
    pub universe_host: Option<String>,
    #[serde(default)]
    pub sync_mode: SyncMode,
}
