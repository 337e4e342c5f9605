//! Types for wallet operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::gateway::{Asset, AssetBalance, DaemonInfo, GatewayError, UniverseStats};

/// Errors that can occur during a wallet operation.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Local input check failed; nothing was sent.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

/// Assets and balances, fetched together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub assets: Vec<Asset>,
    /// Keyed by asset id.
    pub balances: BTreeMap<String, AssetBalance>,
}

impl Portfolio {
    /// Assets grouped by id, amounts summed across outputs.
    pub fn holdings(&self) -> Vec<Holding> {
        group_assets(&self.assets)
    }
}

/// One asset id's total across all its outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub asset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub total_amount: u64,
    /// Number of outputs holding this asset.
    pub outputs: usize,
}

pub(crate) fn group_assets(assets: &[Asset]) -> Vec<Holding> {
    let mut grouped: BTreeMap<String, Holding> = BTreeMap::new();

    for asset in assets {
        let Some(asset_id) = asset
            .asset_id
            .clone()
            .or_else(|| asset.asset_genesis.as_ref().and_then(|g| g.asset_id.clone()))
        else {
            continue;
        };
        let amount = asset
            .amount
            .as_deref()
            .and_then(|a| a.parse::<u64>().ok())
            .unwrap_or(0);

        let holding = grouped.entry(asset_id.clone()).or_insert_with(|| Holding {
            asset_id,
            name: asset.asset_genesis.as_ref().and_then(|g| g.name.clone()),
            total_amount: 0,
            outputs: 0,
        });
        holding.total_amount = holding.total_amount.saturating_add(amount);
        holding.outputs += 1;
    }

    grouped.into_values().collect()
}

/// A request to destroy some units of an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnInput {
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Must be exactly `BURN`.
    #[serde(default)]
    pub confirm: String,
}

/// Universe and daemon information. Each part is absent when its call failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkOverview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub universe_stats: Option<UniverseStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon_info: Option<DaemonInfo>,
    pub asset_stats: Vec<Value>,
}
