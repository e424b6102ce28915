pub mod settings;
mod store;

pub use settings::{Settings, SettingsPatch};
pub use store::{MemorySettingsStore, SettingsStore, TomlSettingsStore};

use std::path::PathBuf;

use crate::error::SettingsError;

/// Returns `~/.config/microbreak[-dev]/` based on MICROBREAK_ENV.
///
/// Set MICROBREAK_ENV=dev to use a development settings directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, SettingsError> {
    let base_dir = dirs::home_dir()
        .ok_or(SettingsError::NoDataDir)?
        .join(".config");

    let env = std::env::var("MICROBREAK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("microbreak-dev")
    } else {
        base_dir.join("microbreak")
    };

    std::fs::create_dir_all(&dir).map_err(|source| SettingsError::Io {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
