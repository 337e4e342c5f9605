//! Wallet operations over the gateway.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::gateway::{
    Address, Burn, BurnRequest, Gateway, GatewayError, NewAddressRequest, SendRequest, Transfer,
};
use crate::mint::DEFAULT_SEND_FEE_RATE;

use super::types::{group_assets, BurnInput, NetworkOverview, Portfolio, WalletError};

/// Literal the user must type to confirm a burn.
pub const BURN_CONFIRMATION: &str = "BURN";

/// Confirmation text the daemon requires on every burn request.
const DAEMON_BURN_CONFIRMATION: &str = "assets will be destroyed";

/// Read-through access to assets, addresses, transfers, burns and network info.
#[derive(Clone)]
pub struct Wallet {
    gateway: Arc<dyn Gateway>,
}

impl Wallet {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn is_connected(&self) -> bool {
        self.gateway.health().await
    }

    /// Assets and balances, both or neither.
    pub async fn portfolio(&self) -> Result<Portfolio, WalletError> {
        let (assets, balances) =
            futures::try_join!(self.gateway.list_assets(), self.gateway.list_balances())?;
        debug!(assets = assets.len(), balances = balances.len(), "Portfolio fetched");
        Ok(Portfolio { assets, balances })
    }

    pub async fn addresses(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.gateway.list_addresses().await?)
    }

    /// Create a receive address. An empty or non-positive amount becomes 1.
    pub async fn new_address(&self, asset_id: &str, amount: &str) -> Result<Address, WalletError> {
        if asset_id.trim().is_empty() {
            return Err(WalletError::Validation("Asset id is required".to_string()));
        }

        let request = NewAddressRequest {
            asset_id: asset_id.trim().to_string(),
            amt: receive_amount(amount),
        };
        info!(asset_id = %request.asset_id, amt = %request.amt, "Creating receive address");
        Ok(self.gateway.new_address(&request).await?)
    }

    /// Send to a Taproot Assets address at the fixed send fee rate.
    pub async fn send(&self, address: &str) -> Result<Value, WalletError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(WalletError::Validation("Address is required".to_string()));
        }

        info!(fee_rate = DEFAULT_SEND_FEE_RATE, "Sending to address");
        let request = SendRequest {
            tap_addrs: vec![address.to_string()],
            fee_rate: DEFAULT_SEND_FEE_RATE,
        };
        Ok(self.gateway.send(&request).await?)
    }

    pub async fn transfers(&self) -> Result<Vec<Transfer>, WalletError> {
        Ok(self.gateway.list_transfers().await?)
    }

    pub async fn burns(&self) -> Result<Vec<Burn>, WalletError> {
        Ok(self.gateway.list_burns().await?)
    }

    /// Burn part of a holding.
    ///
    /// Requires `confirm == "BURN"` and an amount between 1 and the wallet's
    /// total for the asset. Known daemon failures come back reworded.
    pub async fn burn(&self, input: &BurnInput) -> Result<Value, WalletError> {
        let asset_id = input.asset_id.trim();
        if asset_id.is_empty() || input.amount.trim().is_empty() {
            return Err(WalletError::Validation(
                "Please select an asset and enter an amount".to_string(),
            ));
        }
        if input.confirm != BURN_CONFIRMATION {
            return Err(WalletError::Validation(
                "Please type BURN to confirm".to_string(),
            ));
        }

        let assets = self.gateway.list_assets().await?;
        let max_amount = group_assets(&assets)
            .into_iter()
            .find(|h| h.asset_id == asset_id)
            .map(|h| h.total_amount)
            .unwrap_or(0);
        let amount = match input.amount.trim().parse::<u64>() {
            Ok(n) if n >= 1 && n <= max_amount => n,
            _ => {
                return Err(WalletError::Validation(format!(
                    "Amount must be between 1 and {}",
                    max_amount
                )))
            }
        };

        let request = BurnRequest {
            asset_id: asset_id.to_string(),
            amount_to_burn: amount.to_string(),
            confirmation_text: DAEMON_BURN_CONFIRMATION.to_string(),
            note: input.note.clone().filter(|n| !n.is_empty()),
        };

        info!(asset_id = asset_id, amount = amount, "Burning asset");
        self.gateway.burn(&request).await.map_err(|e| {
            warn!(asset_id = asset_id, error = %e, "Burn failed");
            WalletError::Gateway(explain_burn_error(e))
        })
    }

    /// Universe stats, daemon info and per-asset stats. Failing parts are
    /// left empty.
    pub async fn network_overview(&self) -> NetworkOverview {
        let (universe_stats, daemon_info, asset_stats) = futures::join!(
            self.gateway.universe_stats(),
            self.gateway.daemon_info(),
            self.gateway.asset_stats(),
        );

        NetworkOverview {
            universe_stats: ok_or_log("universe stats", universe_stats),
            daemon_info: ok_or_log("daemon info", daemon_info),
            asset_stats: ok_or_log("asset stats", asset_stats).unwrap_or_default(),
        }
    }
}

fn ok_or_log<T>(part: &'static str, result: Result<T, GatewayError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(part = part, error = %e, "Network info unavailable");
            None
        }
    }
}

/// Amount for a new receive address: the leading integer of `input` when
/// positive, otherwise `"1"`.
pub fn receive_amount(input: &str) -> String {
    let digits: String = input
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u64>() {
        Ok(n) if n > 0 => n.to_string(),
        _ => "1".to_string(),
    }
}

/// Replace known daemon burn failures with something the user can act on.
fn explain_burn_error(error: GatewayError) -> GatewayError {
    let message = error.remote_message().unwrap_or_default();

    let explained = if message.contains("burning all assets of an anchor output is not supported")
    {
        "Cannot burn: This is the only asset in its UTXO. \
         For collectibles, you need multiple units across different UTXOs to burn any. \
         For divisible assets, try burning a smaller amount or send some to yourself first \
         to create multiple UTXOs."
    } else if message.contains("unable to select coins") || message.contains("funding") {
        "Insufficient funds or UTXOs not ready. \
         The asset might need to be confirmed on-chain first. \
         Try mining some blocks and waiting a moment."
    } else {
        return error;
    };

    match error {
        GatewayError::Http { status, .. } => GatewayError::Http {
            status,
            message: explained.to_string(),
        },
        GatewayError::Application { code, .. } => GatewayError::Application {
            code,
            message: explained.to_string(),
        },
        other => other,
    }
}
