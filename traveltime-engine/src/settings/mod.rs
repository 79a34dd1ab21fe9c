//! Persisted engine settings.
//!
//! The usage counter, the warning threshold and the connection toggles live
//! outside the engine, behind the [`SettingsStore`] trait. Two stores are
//! provided: [`MemorySettings`] for tests and embedding, and
//! [`FileSettings`] which keeps them in a JSON file between runs.

mod file;
mod store;

use serde::{Deserialize, Serialize};

pub use file::FileSettings;
pub use store::{MemorySettings, SettingsStore};

/// Everything the engine reads from or writes to the settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether the usage guard is active
    pub warning_enabled: bool,
    /// Number of uncached requests allowed before the guard holds
    pub warning_limit: u64,
    /// Uncached successful requests made so far
    pub current_count: u64,
    /// Log every request and response
    pub log_calls: bool,
    /// Replaces the client's base URL when set
    pub custom_endpoint: Option<String>,
    /// Skip TLS certificate verification
    pub disable_https: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            warning_enabled: true,
            warning_limit: 10,
            current_count: 0,
            log_calls: false,
            custom_endpoint: None,
            disable_https: false,
        }
    }
}

impl Settings {
    /// The custom endpoint, ignoring blank values.
    pub fn endpoint_override(&self) -> Option<&str> {
        self.custom_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Errors from reading or writing settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// Reading or writing the backing file failed
    #[error("settings I/O error: {message}")]
    Io { message: String },

    /// The backing file is not valid settings JSON
    #[error("settings JSON error: {message}")]
    Json { message: String },
}
