//! Usage guard.
//!
//! Before each request the guard compares the persisted counter with the
//! warning threshold. Under the threshold (or with the warning disabled) the
//! request goes ahead at once. At or over it, the guard waits and checks
//! again, a bounded number of times. Nothing in the engine lowers the
//! counter while it waits: the hold is released only when someone raises
//! the limit, resets the counter or disables the warning in the store.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::settings::{Settings, SettingsStore};

use super::config::GuardConfig;
use super::error::EngineError;

/// Outcome of one check against the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    /// The warning is switched off
    Disabled,
    /// This many requests remain after the upcoming one
    Available { remaining: u64 },
    /// The upcoming request would reach the threshold
    Exhausted { limit: u64 },
}

/// Evaluate the settings for the upcoming request.
///
/// Both sides are offset by one: the upcoming request is counted before it
/// is made, and a limit of `L` allows `L` requests.
pub fn evaluate(settings: &Settings) -> Quota {
    if !settings.warning_enabled {
        return Quota::Disabled;
    }
    let count = settings.current_count.saturating_add(1);
    let limit = settings.warning_limit.saturating_add(1);
    if count >= limit {
        Quota::Exhausted {
            limit: settings.warning_limit,
        }
    } else {
        Quota::Available {
            remaining: limit - count,
        }
    }
}

/// Waits out the usage threshold before a request.
#[derive(Debug, Clone, Default)]
pub struct RateLimitGuard {
    config: GuardConfig,
}

impl RateLimitGuard {
    /// Create a guard. At least one check is always made, so zero
    /// attempts counts as one.
    pub fn new(config: GuardConfig) -> Self {
        let attempts = config.attempts.max(1);
        Self {
            config: config.with_attempts(attempts),
        }
    }

    /// Return once the store allows another request.
    ///
    /// Makes up to `attempts` checks with `interval` between them. Fails
    /// with `UsageLimitExceeded` if the last check is still over the
    /// threshold, or with `Cancelled` if `cancel` fires while waiting.
    pub async fn wait_for_quota(
        &self,
        store: &dyn SettingsStore,
        cancel: &CancellationToken,
    ) -> Result<Quota, EngineError> {
        let attempts = self.config.attempts;
        let mut last_limit = 0;

        for attempt in 0..attempts {
            let settings = store.get()?;
            match evaluate(&settings) {
                Quota::Disabled => {
                    info!("usage warning disabled");
                    return Ok(Quota::Disabled);
                }
                Quota::Available { remaining } => {
                    info!(remaining, "requests remaining before usage warning");
                    return Ok(Quota::Available { remaining });
                }
                Quota::Exhausted { limit } => {
                    last_limit = limit;
                    if attempt == 0 {
                        warn!(
                            limit,
                            count = settings.current_count,
                            "usage limit reached; raise the limit, reset the counter \
                             or disable the warning to continue"
                        );
                    }
                    if attempt + 1 == attempts {
                        break;
                    }
                    info!(
                        retry = attempt + 1,
                        of = attempts,
                        wait_secs = self.config.interval.as_secs(),
                        "waiting for usage limit"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(EngineError::Cancelled),
                        _ = tokio::time::sleep(self.config.interval) => {}
                    }
                }
            }
        }

        Err(EngineError::UsageLimitExceeded {
            limit: last_limit,
            attempts,
        })
    }
}
