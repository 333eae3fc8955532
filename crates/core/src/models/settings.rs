use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::CoreError;
use crate::providers::retry::RetryConfig;

/// Public mock endpoint serving the sample holdings document.
pub const DEFAULT_ENDPOINT_URL: &str = "https://35dee773a9ec441e9f38d5fc249406ce.api.mockbin.io/";

/// Runtime configuration for the portfolio core.
///
/// Every field has a default, so a settings file only needs to name what it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// URL of the holdings endpoint (GET, unauthenticated).
    pub endpoint_url: String,

    /// Whole-request timeout for the holdings call.
    pub request_timeout_ms: u64,

    /// TCP connect timeout for the holdings call.
    pub connect_timeout_ms: u64,

    /// How long the connectivity probe waits for a TCP handshake.
    pub probe_timeout_ms: u64,

    /// Where the holdings cache lives. `None` keeps it in memory only.
    pub cache_path: Option<PathBuf>,

    /// Backoff policy for transient fetch failures.
    pub retry: RetryConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 30_000,
            probe_timeout_ms: 1_500,
            cache_path: None,
            retry: RetryConfig::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse a JSON settings file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ValidationError(format!("Cannot read settings file {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Check that the settings describe a usable configuration.
    pub fn validate(&self) -> Result<(), CoreError> {
        let url = reqwest::Url::parse(&self.endpoint_url).map_err(|e| {
            CoreError::ValidationError(format!("Invalid endpoint URL '{}': {e}", self.endpoint_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::ValidationError(format!(
                "Endpoint URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(CoreError::ValidationError(format!(
                "Endpoint URL '{}' has no host",
                self.endpoint_url
            )));
        }

        for (name, value) in [
            ("request_timeout_ms", self.request_timeout_ms),
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("probe_timeout_ms", self.probe_timeout_ms),
        ] {
            if value == 0 {
                return Err(CoreError::ValidationError(format!("{name} must be greater than zero")));
            }
        }

        self.retry.validate()
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}
