//! # Microbreak Core Library
//!
//! Core logic for the Microbreak focus timer: long focus sessions punctuated
//! by short, randomly spaced break cues, followed by a long break. The CLI is
//! a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: owns the session and its deferred callbacks, runs as its
//!   own task (or its own thread) and talks only through typed channels
//! - **Bridge**: client-side mirror of the engine state; turns cues into sounds
//! - **Storage**: TOML settings with lenient, field-by-field loading
//! - **Audio**: sound catalogue and the playback seam
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: timer task and state machine driver
//! - [`Bridge`]: engine client used by front ends
//! - [`Settings`]: persisted user settings
//! - [`AudioPlayer`]: playback trait for cue sounds

pub mod audio;
pub mod bridge;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod timer;

pub use audio::{AudioPlayer, NullPlayer, Sound, SoundKind, SOUNDS};
pub use bridge::Bridge;
pub use error::{AudioError, CoreError, Result, SettingsError, ValidationError};
pub use protocol::{Command, Cue, CueNotice, EngineEvent, TimerView, TimingSettings};
pub use storage::{MemorySettingsStore, Settings, SettingsPatch, SettingsStore, TomlSettingsStore};
pub use timer::{Clock, EngineLink, Phase, SystemClock, TimerEngine, TimerSession, TokioClock};
