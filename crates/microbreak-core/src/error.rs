//! Core error types for microbreak-core.
//!
//! Timing itself never fails: invalid commands are ignored and engine problems
//! surface as events. These types cover the edges around the engine -- settings
//! persistence, settings validation, audio playback and engine start-up.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for microbreak-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings persistence errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Audio playback errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// The engine's execution context could not be created
    #[error("Timer engine unavailable: {0}")]
    EngineUnavailable(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings storage errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// No home/config directory could be determined
    #[error("Could not determine a configuration directory")]
    NoDataDir,

    /// Reading or writing the settings file failed
    #[error("Failed to access settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Unknown settings key
    #[error("Unknown settings key: {0}")]
    UnknownKey(String),

    /// A value could not be parsed for the key's type
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The parsed value violates a settings constraint
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Settings validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Minutes value outside the accepted range
    #[error("'{field}' must be between {min} and {max} minutes (got {value})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Short-break interval bounds are inverted
    #[error("short-break interval minimum ({min}) exceeds maximum ({max})")]
    IntervalBoundsInverted { min: u32, max: u32 },

    /// Sound id not in the catalogue
    #[error("'{field}' references unknown sound '{id}'")]
    UnknownSound { field: &'static str, id: String },
}

/// Audio playback errors.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The player cannot resolve the sound id to an asset
    #[error("No audio asset for sound '{0}'")]
    UnknownSound(String),

    /// The audio backend refused or failed to play
    #[error("Audio backend failure: {0}")]
    Backend(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
