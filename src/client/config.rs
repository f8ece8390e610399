//! Connection settings for the remote API
//!
//! Sources, lowest priority first:
//! 1. Defaults (`http://10.0.2.2:5006/api`, 15 second timeout)
//! 2. An optional `config/hisab.toml` file
//! 3. `HISAB__BASE_URL` / `HISAB__TIMEOUT_SECS` environment variables

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::*;

/// Remote API connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL that `/Users`, `/Customers` and `/Staffs` hang off
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    // host loopback as seen from the Android emulator
    "http://10.0.2.2:5006/api".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Load settings from `config/hisab` and the environment
    pub fn load() -> HisabResult<Self> {
        Self::load_from("config/hisab")
    }

    /// Load settings from the given file stem and the environment
    pub fn load_from(path: &str) -> HisabResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("HISAB").separator("__"))
            .build()
            .map_err(|e| HisabError::Config(e.to_string()))?;

        Self::from_config(config)
    }

    /// Deserialize and validate settings from an assembled `config::Config`
    pub fn from_config(config: config::Config) -> HisabResult<Self> {
        let settings: Self = config
            .try_deserialize()
            .map_err(|e| HisabError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that the base URL is HTTP(S) and the timeout is non-zero
    pub fn validate(&self) -> HisabResult<()> {
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(HisabError::Config(format!(
                "base_url must start with http:// or https://, got '{base_url}'"
            )));
        }

        if self.timeout_secs == 0 {
            return Err(HisabError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
