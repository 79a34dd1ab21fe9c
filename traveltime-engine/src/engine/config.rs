//! Engine configuration.

use std::time::Duration;

use crate::api::ClientConfig;
use crate::cache::CacheConfig;

use super::error::EngineError;

/// Default number of searches per side in one request.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Configuration for the usage guard's wait loop.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// How long to wait between checks while over the threshold.
    pub interval: Duration,

    /// How many checks to make before giving up.
    pub attempts: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            attempts: 10,
        }
    }
}

impl GuardConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

/// Configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum searches per side in one request.
    pub batch_size: usize,

    pub client: ClientConfig,

    pub cache: CacheConfig,

    pub guard: GuardConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            client: ClientConfig::default(),
            cache: CacheConfig::default(),
            guard: GuardConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Set the batch size. Checked by [`EngineConfig::validate`].
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_guard(mut self, guard: GuardConfig) -> Self {
        self.guard = guard;
        self
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.batch_size == 0 {
            return Err(EngineError::InvalidConfig {
                message: "batch size must be at least 1".to_string(),
            });
        }
        if self.guard.attempts == 0 {
            return Err(EngineError::InvalidConfig {
                message: "guard attempts must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.guard.interval, Duration::from_secs(10));
        assert_eq!(config.guard.attempts, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_batch_size_rejected() {
        let config = EngineConfig::default().with_batch_size(0);
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = EngineConfig::default().with_guard(GuardConfig::default().with_attempts(0));
        assert!(config.validate().is_err());
    }
}
