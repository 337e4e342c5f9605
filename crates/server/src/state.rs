use std::sync::Arc;

use tapdash_core::{Config, Explorer, Gateway, MintOrchestrator, SanitizedConfig, Wallet};

/// Shared application state
pub struct AppState {
    config: Config,
    gateway: Arc<dyn Gateway>,
    mint: Arc<MintOrchestrator>,
    wallet: Wallet,
    explorer: Explorer,
}

impl AppState {
    /// Build the mint orchestrator, wallet and explorer over `gateway`. The orchestrator
    /// is not started.
    pub fn new(config: Config, gateway: Arc<dyn Gateway>) -> Self {
        let mint = Arc::new(MintOrchestrator::new(
            config.mint.clone(),
            Arc::clone(&gateway),
        ));
        let wallet = Wallet::new(Arc::clone(&gateway));
        let explorer = Explorer::new(Arc::clone(&gateway));

        Self {
            config,
            gateway,
            mint,
            wallet,
            explorer,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    pub fn mint(&self) -> &Arc<MintOrchestrator> {
        &self.mint
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }
}
