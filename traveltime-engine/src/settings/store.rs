//! The settings store interface and its in-memory implementation.

use parking_lot::Mutex;

use super::{Settings, SettingsError};

/// Read/write access to persisted settings.
///
/// Implementations must make `increment_count` atomic with respect to other
/// calls on the same store.
pub trait SettingsStore: Send + Sync {
    /// Current settings.
    fn get(&self) -> Result<Settings, SettingsError>;

    /// Replace all settings.
    fn set(&self, settings: Settings) -> Result<(), SettingsError>;

    /// Add one to the usage counter and return the new value.
    fn increment_count(&self) -> Result<u64, SettingsError>;

    /// Set the usage counter back to zero.
    fn reset_count(&self) -> Result<(), SettingsError> {
        let mut settings = self.get()?;
        settings.current_count = 0;
        self.set(settings)
    }
}

/// Settings held in process memory.
#[derive(Debug, Default)]
pub struct MemorySettings {
    inner: Mutex<Settings>,
}

impl MemorySettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self) -> Result<Settings, SettingsError> {
        Ok(self.inner.lock().clone())
    }

    fn set(&self, settings: Settings) -> Result<(), SettingsError> {
        *self.inner.lock() = settings;
        Ok(())
    }

    fn increment_count(&self) -> Result<u64, SettingsError> {
        let mut settings = self.inner.lock();
        settings.current_count += 1;
        Ok(settings.current_count)
    }

    fn reset_count(&self) -> Result<(), SettingsError> {
        self.inner.lock().current_count = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_and_reset() {
        let store = MemorySettings::default();
        assert_eq!(store.increment_count().unwrap(), 1);
        assert_eq!(store.increment_count().unwrap(), 2);
        assert_eq!(store.get().unwrap().current_count, 2);

        store.reset_count().unwrap();
        assert_eq!(store.get().unwrap().current_count, 0);
    }

    #[test]
    fn set_replaces_everything() {
        let store = MemorySettings::default();
        store
            .set(Settings {
                warning_limit: 3,
                log_calls: true,
                ..Settings::default()
            })
            .unwrap();

        let settings = store.get().unwrap();
        assert_eq!(settings.warning_limit, 3);
        assert!(settings.log_calls);
    }
}
