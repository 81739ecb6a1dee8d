//! Client configuration.
//!
//! Loaded via the `config` crate from an optional file layered under
//! environment variables prefixed with `FLOWDECK__`:
//!
//! - `FLOWDECK__BASE_URL`: flow service API root (default `http://127.0.0.1:8000/api`)
//! - `FLOWDECK__API_TOKEN`: bearer token sent with every request (default none)
//! - `FLOWDECK__CONNECT_TIMEOUT_SECONDS`: connection establishment timeout (default 10)

use crate::error::ConfigError;
use rootcause::prelude::Report;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Settings for reaching the flow service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// API root; endpoint paths such as `/flows` are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token, if the service requires one.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Limit on establishing a connection. Requests themselves have no
    /// timeout, so long flow runs are never cut off.
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

impl ClientConfig {
    /// Environment variable prefix.
    pub const ENV_PREFIX: &'static str = "FLOWDECK";

    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has the wrong type or a value is unusable.
    pub fn from_env() -> Result<Self, Report<ConfigError>> {
        Self::load(None)
    }

    /// Loads configuration from an optional file, then environment
    /// variables, later sources winning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a value has the wrong
    /// type, or a value is unusable.
    pub fn load(file: Option<&Path>) -> Result<Self, Report<ConfigError>> {
        Self::load_with_env(file, None)
    }

    fn load_with_env(
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, Report<ConfigError>> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(|e| ConfigError::Load {
                details: e.to_string(),
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::Load {
                details: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Report<ConfigError>> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: format!("'{}' is not an http(s) URL", self.base_url),
            }
            .into());
        }
        if self.connect_timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "connect_timeout_seconds",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// The connection establishment timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_without_sources() {
        let config = ClientConfig::load_with_env(None, env(&[])).expect("load");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn reads_prefixed_environment() {
        let config = ClientConfig::load_with_env(
            None,
            env(&[
                ("FLOWDECK__BASE_URL", "https://flows.example.com/api"),
                ("FLOWDECK__API_TOKEN", "secret"),
                ("FLOWDECK__CONNECT_TIMEOUT_SECONDS", "3"),
            ]),
        )
        .expect("load");

        assert_eq!(config.base_url, "https://flows.example.com/api");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.connect_timeout_seconds, 3);
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "base_url = \"http://file.example.com/api\"").expect("write");
        writeln!(file, "connect_timeout_seconds = 7").expect("write");

        let config = ClientConfig::load_with_env(
            Some(file.path()),
            env(&[("FLOWDECK__BASE_URL", "http://env.example.com/api")]),
        )
        .expect("load");

        assert_eq!(config.base_url, "http://env.example.com/api");
        assert_eq!(config.connect_timeout_seconds, 7);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = ClientConfig::load_with_env(Some(&dir.path().join("absent.toml")), env(&[])).unwrap_err();
        assert!(err.to_string().contains("failed to load configuration"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = ClientConfig::load_with_env(None, env(&[("FLOWDECK__BASE_URL", "ftp://x")])).unwrap_err();
        assert!(err.to_string().contains("invalid configuration base_url"));
    }

    #[test]
    fn rejects_zero_connect_timeout() {
        let err = ClientConfig::load_with_env(None, env(&[("FLOWDECK__CONNECT_TIMEOUT_SECONDS", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("connect_timeout_seconds"));
    }
}
