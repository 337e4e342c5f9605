//! Types for the mint wizard.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::gateway::{AssetMeta, AssetType, GatewayError, MintBatch, NewAsset};

/// Errors that can occur during a wizard action.
#[derive(Debug, Error)]
pub enum MintError {
    /// Local input check failed; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// Action not available in the current stage.
    #[error("invalid wizard stage: expected {expected}, got {actual}")]
    InvalidStage { expected: Stage, actual: Stage },

    /// Another wizard action has not completed yet.
    #[error("another mint action is already in progress")]
    Busy,

    /// The gateway call failed.
    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

/// Local wizard step. Distinct from the remote batch state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Filling in a mint request.
    #[default]
    Create,
    /// A mint was accepted; waiting for finalize or cancel.
    Finalize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Create => "create",
            Stage::Finalize => "finalize",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user typed into the create form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    #[serde(default)]
    pub asset_type: AssetType,
    #[serde(default)]
    pub name: String,
    /// Raw amount text. Ignored for collectibles.
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: String,
    #[serde(default)]
    pub metadata: String,
}

impl MintRequest {
    pub fn normal(name: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            asset_type: AssetType::Normal,
            name: name.into(),
            amount: amount.into(),
            metadata: String::new(),
        }
    }

    pub fn collectible(name: impl Into<String>) -> Self {
        Self {
            asset_type: AssetType::Collectible,
            name: name.into(),
            amount: String::new(),
            metadata: String::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Empty the text fields. The asset type selection is kept.
    pub fn clear(&mut self) {
        self.name.clear();
        self.amount.clear();
        self.metadata.clear();
    }

    /// Check the form and build the gateway payload.
    pub fn to_new_asset(&self) -> Result<NewAsset, MintError> {
        if self.name.trim().is_empty() {
            return Err(MintError::Validation("Asset name is required".to_string()));
        }

        let amount = match self.asset_type {
            AssetType::Collectible => "1".to_string(),
            AssetType::Normal => match self.amount.trim().parse::<i64>() {
                Ok(n) if n > 0 => n.to_string(),
                _ => {
                    return Err(MintError::Validation(
                        "Amount must be greater than 0 for normal assets".to_string(),
                    ))
                }
            },
        };

        let asset_meta = (!self.metadata.is_empty()).then(|| AssetMeta {
            data: BASE64.encode(self.metadata.as_bytes()),
            meta_type: "0".to_string(),
        });

        Ok(NewAsset {
            asset_type: self.asset_type,
            name: self.name.clone(),
            amount,
            asset_meta,
        })
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Local copy of the gateway's batch list. Always replaced whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub batches: Vec<MintBatch>,
    /// When the list was fetched (None before the first load).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl BatchSnapshot {
    pub fn new(batches: Vec<MintBatch>) -> Self {
        Self {
            batches,
            fetched_at: Some(Utc::now()),
        }
    }

    /// First batch still open for seedlings.
    pub fn pending_batch(&self) -> Option<&MintBatch> {
        self.batches.iter().find(|b| b.state.is_pending())
    }

    /// First batch that has been funded, by label or by payload.
    pub fn funded_batch(&self) -> Option<&MintBatch> {
        self.batches.iter().find(|b| {
            b.state == crate::gateway::BatchState::Funded || b.has_funded_payload()
        })
    }

    pub fn finalized_batches(&self) -> Vec<&MintBatch> {
        self.batches
            .iter()
            .filter(|b| b.state.is_finalized())
            .collect()
    }

    /// Whether any batch carries a funded transaction payload.
    pub fn has_funded_payload(&self) -> bool {
        self.batches.iter().any(MintBatch::has_funded_payload)
    }
}

/// Everything a front-end needs to render the wizard.
#[derive(Debug, Clone, Serialize)]
pub struct MintStatus {
    pub running: bool,
    pub stage: Stage,
    pub request: MintRequest,
    /// A wizard action is waiting on the gateway.
    pub in_flight: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub snapshot: BatchSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_batch: Option<MintBatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funded_batch: Option<MintBatch>,
    pub finalized_batches: Vec<MintBatch>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::BatchState;
    use serde_json::json;

    #[test]
    fn test_missing_name_rejected() {
        let err = MintRequest::normal("   ", "10").to_new_asset().unwrap_err();
        assert!(matches!(err, MintError::Validation(_)));
        assert_eq!(err.to_string(), "Asset name is required");
    }

    #[test]
    fn test_normal_amount_must_be_positive() {
        for amount in ["", "0", "-5", "ten", "1.5"] {
            let err = MintRequest::normal("Gold", amount).to_new_asset().unwrap_err();
            assert_eq!(
                err.to_string(),
                "Amount must be greater than 0 for normal assets",
                "amount {:?}",
                amount
            );
        }
    }

    #[test]
    fn test_normal_amount_is_normalized() {
        let asset = MintRequest::normal("Gold", " 21000 ").to_new_asset().unwrap();
        assert_eq!(asset.amount, "21000");
        assert_eq!(asset.asset_type, AssetType::Normal);
        assert!(asset.asset_meta.is_none());
    }

    #[test]
    fn test_collectible_amount_forced_to_one() {
        let mut request = MintRequest::collectible("CoolNFT");
        assert_eq!(request.to_new_asset().unwrap().amount, "1");

        request.amount = "500".to_string();
        assert_eq!(request.to_new_asset().unwrap().amount, "1");
    }

    #[test]
    fn test_metadata_is_base64_encoded() {
        let asset = MintRequest::normal("Gold", "1")
            .with_metadata("hello")
            .to_new_asset()
            .unwrap();
        let meta = asset.asset_meta.unwrap();
        assert_eq!(meta.data, "aGVsbG8=");
        assert_eq!(meta.meta_type, "0");
    }

    #[test]
    fn test_clear_keeps_asset_type() {
        let mut request = MintRequest::collectible("CoolNFT").with_metadata("art");
        request.clear();
        assert_eq!(request.asset_type, AssetType::Collectible);
        assert!(request.name.is_empty());
        assert!(request.amount.is_empty());
        assert!(request.metadata.is_empty());
    }

    #[test]
    fn test_request_accepts_numeric_amount() {
        let request: MintRequest = serde_json::from_value(json!({
            "asset_type": "NORMAL",
            "name": "Gold",
            "amount": 100
        }))
        .unwrap();
        assert_eq!(request.amount, "100");
    }

    #[test]
    fn test_snapshot_views() {
        let snapshot = BatchSnapshot::new(vec![
            MintBatch {
                batch_key: Some("a".to_string()),
                state: BatchState::Confirmed,
                ..Default::default()
            },
            MintBatch {
                batch_key: Some("b".to_string()),
                state: BatchState::Pending,
                ..Default::default()
            },
            MintBatch {
                batch_key: Some("c".to_string()),
                state: BatchState::Frozen,
                batch_psbt: Some("cHNidP8=".to_string()),
                ..Default::default()
            },
        ]);

        assert_eq!(snapshot.pending_batch().unwrap().batch_key.as_deref(), Some("b"));
        assert_eq!(snapshot.funded_batch().unwrap().batch_key.as_deref(), Some("c"));
        assert_eq!(snapshot.finalized_batches().len(), 1);
        assert!(snapshot.has_funded_payload());
        assert!(snapshot.fetched_at.is_some());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = BatchSnapshot::default();
        assert!(snapshot.pending_batch().is_none());
        assert!(snapshot.funded_batch().is_none());
        assert!(!snapshot.has_funded_payload());
    }

    #[test]
    fn test_error_display() {
        let err = MintError::InvalidStage {
            expected: Stage::Finalize,
            actual: Stage::Create,
        };
        assert_eq!(
            err.to_string(),
            "invalid wizard stage: expected finalize, got create"
        );
    }
}
