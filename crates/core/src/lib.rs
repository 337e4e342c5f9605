pub mod config;
pub mod explorer;
pub mod gateway;
pub mod mint;
pub mod testing;
pub mod wallet;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, GatewayConfig, LogFormat, LoggingConfig, MintConfig, SanitizedConfig,
    ServerConfig,
};
pub use explorer::{Explorer, ExplorerError};
pub use gateway::{Gateway, GatewayError, RestGateway};
pub use mint::{MintError, MintOrchestrator, MintRequest, MintStatus, Stage};
pub use wallet::{Wallet, WalletError};
