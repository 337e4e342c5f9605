//! Testing utilities and mock implementations.
//!
//! This module provides a mock `Gateway`, allowing the orchestrator and the
//! HTTP API to be tested without a running daemon.
//!
//! # Example
//!
//! ```rust,ignore
//! use tapdash_core::testing::{fixtures, MockGateway};
//!
//! let gateway = MockGateway::new();
//! gateway.set_batches(vec![fixtures::pending_batch("02aa")]).await;
//! gateway.set_next_error(GatewayError::Timeout).await;
//!
//! // Use in AppState...
//! ```

mod mock_gateway;

pub use mock_gateway::{MockGateway, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use crate::gateway::{Asset, AssetBalance, AssetGenesis, BatchState, ChainAnchor, MintBatch};

    /// A batch still accepting seedlings.
    pub fn pending_batch(batch_key: &str) -> MintBatch {
        MintBatch {
            batch_key: Some(batch_key.to_string()),
            state: BatchState::Pending,
            assets: vec![json!({ "name": "Gold", "amount": "100", "asset_type": "NORMAL" })],
            ..Default::default()
        }
    }

    /// A pending batch that already carries a funded transaction.
    pub fn funded_batch(batch_key: &str) -> MintBatch {
        MintBatch {
            batch_psbt: Some("cHNidP8BAF4CAAAAAQ==".to_string()),
            ..pending_batch(batch_key)
        }
    }

    /// A batch mined at `height`.
    pub fn confirmed_batch(batch_key: &str, height: u32) -> MintBatch {
        MintBatch {
            batch_key: Some(batch_key.to_string()),
            batch_txid: Some(format!("{:0>64}", height)),
            state: BatchState::Confirmed,
            height_hint: Some(height),
            ..Default::default()
        }
    }

    /// An owned asset.
    pub fn asset(name: &str, asset_id: &str, amount: u64) -> Asset {
        Asset {
            asset_id: Some(asset_id.to_string()),
            asset_type: Some("NORMAL".to_string()),
            amount: Some(amount.to_string()),
            asset_genesis: Some(AssetGenesis {
                name: Some(name.to_string()),
                asset_id: Some(asset_id.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// An owned asset anchored at `outpoint` (`"<txid hex>:<index>"`).
    pub fn anchored_asset(name: &str, asset_id: &str, outpoint: &str) -> Asset {
        Asset {
            script_key: Some(format!("02{:0>64}", asset_id)),
            chain_anchor: Some(ChainAnchor {
                anchor_outpoint: Some(outpoint.to_string()),
                block_height: Some(120),
                anchor_tx: None,
            }),
            ..asset(name, asset_id, 10)
        }
    }

    /// A balance entry for `asset_id`.
    pub fn balance(name: &str, asset_id: &str, amount: u64) -> AssetBalance {
        AssetBalance {
            asset_id: asset_id.to_string(),
            balance: amount.to_string(),
            asset_genesis: Some(AssetGenesis {
                name: Some(name.to_string()),
                asset_id: Some(asset_id.to_string()),
                ..Default::default()
            }),
        }
    }
}
