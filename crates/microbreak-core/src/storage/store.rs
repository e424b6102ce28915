use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::warn;

use super::data_dir;
use super::settings::Settings;
use crate::error::SettingsError;

/// Where settings persist between runs.
pub trait SettingsStore: Send {
    /// Stored settings, or `None` when nothing has been saved yet or the
    /// store is unreadable. A readable but malformed payload still yields
    /// settings, defaulted field by field.
    fn load(&self) -> Option<Settings>;

    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// `settings.toml` on disk.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/microbreak[-dev]/settings.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or created.
    pub fn open_default() -> Result<Self, SettingsError> {
        Ok(Self::new(data_dir()?.join("settings.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Option<Settings> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Some(Settings::from_toml_str(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read settings from {}: {e}", self.path.display());
                None
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let content = settings.to_toml_string()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, content).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-process store. Keeps the serialized payload so loads go through the
/// same lenient parsing as the file store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    payload: Mutex<Option<String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a raw payload, valid or not.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
        }
    }

    pub fn payload(&self) -> Option<String> {
        self.payload.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Option<Settings> {
        self.payload().map(|content| Settings::from_toml_str(&content))
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let content = settings.to_toml_string()?;
        if let Ok(mut guard) = self.payload.lock() {
            *guard = Some(content);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom() -> Settings {
        Settings {
            focus_duration_minutes: 45,
            short_break_min_interval_minutes: 2,
            short_break_max_interval_minutes: 4,
            long_break_duration_minutes: 15,
            short_break_sound: "notification-soft".into(),
            end_sound: "meditation-bell".into(),
        }
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlSettingsStore::new(dir.path().join("nested").join("settings.toml"));
        assert_eq!(store.load(), None);

        store.save(&custom()).unwrap();
        assert_eq!(store.load(), Some(custom()));
    }

    #[test]
    fn file_store_tolerates_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "focus_duration_minutes = [oops").unwrap();
        let store = TomlSettingsStore::new(&path);
        assert_eq!(store.load(), Some(Settings::default()));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.load(), None);
        store.save(&custom()).unwrap();
        assert_eq!(store.load(), Some(custom()));
    }

    #[test]
    fn memory_store_merges_partial_payload() {
        let store = MemorySettingsStore::with_payload("end_sound = \"piano-chord\"\n");
        let loaded = store.load().unwrap();
        assert_eq!(loaded.end_sound, "piano-chord");
        assert_eq!(loaded.focus_duration_minutes, 60);
    }
}
