use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable prefix. Nested keys use a double underscore,
/// e.g. `TAPDASH_GATEWAY__URL` or `TAPDASH_MINT__POLL_INTERVAL_MS`.
const ENV_PREFIX: &str = "TAPDASH_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from defaults and environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[gateway]
url = "http://127.0.0.1:8089"

[server]
port = 9000
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.gateway.url, "http://127.0.0.1:8089");
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.gateway.url, "http://localhost:8080");
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[mint]
poll_interval_ms = "often"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "127.0.0.1"
port = 3100

[gateway]
url = "http://10.0.0.5:8080"
timeout_secs = 20
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3100);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.gateway.timeout_secs, Some(20));
        assert_eq!(config.mint.poll_interval_ms, 15_000);
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[gateway]
url = "http://from-file:8080"
"#,
            )?;
            jail.set_env("TAPDASH_GATEWAY__URL", "http://from-env:8080");
            jail.set_env("TAPDASH_MINT__REFRESH_DELAY_MS", "250");

            let config = load_config(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.gateway.url, "http://from-env:8080");
            assert_eq!(config.mint.refresh_delay_ms, 250);
            Ok(())
        });
    }

    #[test]
    fn test_load_config_from_env_only() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TAPDASH_SERVER__PORT", "4010");
            jail.set_env("TAPDASH_LOGGING__FORMAT", "json");

            let config = load_config_from_env().map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 4010);
            assert_eq!(config.gateway.url, "http://localhost:8080");
            assert_eq!(config.logging.format, crate::config::LogFormat::Json);
            Ok(())
        });
    }
}
