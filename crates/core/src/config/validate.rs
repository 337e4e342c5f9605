use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Gateway URL is http(s)
/// - Mint poll interval is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let url = config.gateway.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "gateway.url must start with http:// or https:// (got {:?})",
            config.gateway.url
        )));
    }

    if config.gateway.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "gateway.timeout_secs cannot be 0 (omit it to disable the timeout)".to_string(),
        ));
    }

    if config.mint.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "mint.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}
