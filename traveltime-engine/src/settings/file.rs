//! JSON file settings store.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::store::SettingsStore;
use super::{Settings, SettingsError};

/// Settings kept in a JSON file.
///
/// A missing file reads as defaults. Writes go to a sibling temp file which
/// is then renamed over the original, so readers never see a partial file.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Get the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Settings, SettingsError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => {
                return Err(SettingsError::Io {
                    message: format!("failed to read {}: {}", self.path.display(), e),
                });
            }
        };

        serde_json::from_str(&contents).map_err(|e| SettingsError::Json {
            message: format!("{}: {}", self.path.display(), e),
        })
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io {
                message: format!("failed to create settings directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(settings).map_err(|e| SettingsError::Json {
            message: format!("failed to serialize settings: {}", e),
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json).map_err(|e| SettingsError::Io {
            message: format!("failed to write {}: {}", tmp.display(), e),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| SettingsError::Io {
            message: format!("failed to replace {}: {}", self.path.display(), e),
        })
    }
}

impl SettingsStore for FileSettings {
    fn get(&self) -> Result<Settings, SettingsError> {
        let _guard = self.lock.lock();
        self.load()
    }

    fn set(&self, settings: Settings) -> Result<(), SettingsError> {
        let _guard = self.lock.lock();
        self.save(&settings)
    }

    fn increment_count(&self) -> Result<u64, SettingsError> {
        let _guard = self.lock.lock();
        let mut settings = self.load()?;
        settings.current_count += 1;
        self.save(&settings)?;
        Ok(settings.current_count)
    }

    fn reset_count(&self) -> Result<(), SettingsError> {
        let _guard = self.lock.lock();
        let mut settings = self.load()?;
        settings.current_count = 0;
        self.save(&settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileSettings::new(dir.path().join("settings.json"));
        assert_eq!(store.get().unwrap(), Settings::default());
    }

    #[test]
    fn set_then_get() {
        let dir = tempdir().unwrap();
        let store = FileSettings::new(dir.path().join("settings.json"));
        let settings = Settings {
            warning_limit: 50,
            custom_endpoint: Some("http://localhost/v4/".into()),
            ..Settings::default()
        };
        store.set(settings.clone()).unwrap();

        // A second store on the same path sees the write
        let other = FileSettings::new(store.path());
        assert_eq!(other.get().unwrap(), settings);
    }

    #[test]
    fn increment_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileSettings::new(&path);

        assert_eq!(store.increment_count().unwrap(), 1);
        assert_eq!(store.increment_count().unwrap(), 2);
        assert_eq!(FileSettings::new(&path).get().unwrap().current_count, 2);

        store.reset_count().unwrap();
        assert_eq!(store.get().unwrap().current_count, 0);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("settings.json");
        let store = FileSettings::new(&path);
        store.increment_count().unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileSettings::new(&path);
        assert!(matches!(store.get(), Err(SettingsError::Json { .. })));
    }
}
