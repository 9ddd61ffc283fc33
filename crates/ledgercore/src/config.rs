//! Client configuration.
//!
//! Everything has a default; a JSON document only needs the keys it changes.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long a caller waits for a completion before abandoning it.
    pub command_timeout_ms: u64,
    /// Passed through to the native layer's runtime configuration.
    pub crypto_thread_pool_size: usize,
    /// Keep native backtraces on captured errors.
    pub collect_backtrace: bool,
    /// `tracing` filter directive; when set, building a context installs a
    /// global subscriber with it.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command_timeout_ms: 30_000,
            crypto_thread_pool_size: 4,
            collect_backtrace: true,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// The subset of the configuration the native layer consumes.
    pub fn runtime_config_json(&self) -> String {
        serde_json::json!({
            "crypto_thread_pool_size": self.crypto_thread_pool_size,
            "collect_backtrace": self.collect_backtrace,
        })
        .to_string()
    }
}
