//! Cue sounds: the catalogue of known sound ids and the playback seam.
//!
//! Sound ids are opaque strings. The catalogue lets settings reject ids no
//! player could resolve; players map ids to assets however they like.

#[cfg(feature = "playback")]
mod rodio_player;

#[cfg(feature = "playback")]
pub use rodio_player::RodioPlayer;

use log::{debug, warn};

use crate::error::AudioError;

/// Which cue a sound is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    ShortBreak,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sound {
    pub id: &'static str,
    /// Asset file name inside the sounds directory.
    pub file: &'static str,
    pub kind: SoundKind,
    pub label: &'static str,
}

pub const SOUNDS: &[Sound] = &[
    Sound { id: "bell-soft", file: "bell.mp3", kind: SoundKind::ShortBreak, label: "Soft bell" },
    Sound { id: "chime-gentle", file: "chime.wav", kind: SoundKind::ShortBreak, label: "Gentle chime" },
    Sound { id: "water-drop", file: "water.wav", kind: SoundKind::ShortBreak, label: "Water drop" },
    Sound { id: "notification-soft", file: "notification.wav", kind: SoundKind::ShortBreak, label: "Soft notification" },
    Sound { id: "success-chime", file: "success.wav", kind: SoundKind::End, label: "Success" },
    Sound { id: "meditation-bell", file: "meditation.wav", kind: SoundKind::End, label: "Meditation bell" },
    Sound { id: "nature-birds", file: "bird.wav", kind: SoundKind::End, label: "Birdsong" },
    Sound { id: "piano-chord", file: "complete.wav", kind: SoundKind::End, label: "Celebration" },
];

pub fn find_sound(id: &str) -> Option<&'static Sound> {
    SOUNDS.iter().find(|sound| sound.id == id)
}

pub fn is_known_sound(id: &str) -> bool {
    find_sound(id).is_some()
}

/// Plays cue sounds. Implementations must not block the caller for the
/// duration of the sound.
pub trait AudioPlayer: Send {
    /// Start playing `sound_id` at `volume` (clamped to 0..1).
    fn play(&self, sound_id: &str, volume: f32) -> Result<(), AudioError>;

    /// Warm up assets ahead of the first cue. Unresolvable ids are skipped.
    fn preload(&self, _sound_ids: &[&str]) {}
}

/// Player without an output device. Resolves ids against the catalogue and
/// logs what it would have played.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlayer;

impl AudioPlayer for NullPlayer {
    fn play(&self, sound_id: &str, volume: f32) -> Result<(), AudioError> {
        let sound = find_sound(sound_id).ok_or_else(|| AudioError::UnknownSound(sound_id.to_string()))?;
        debug!("cue '{}' ({}) at volume {:.2}", sound.id, sound.file, volume.clamp(0.0, 1.0));
        Ok(())
    }

    fn preload(&self, sound_ids: &[&str]) {
        for id in sound_ids {
            if !is_known_sound(id) {
                warn!("Audio file not found for sound '{id}'");
            }
        }
    }
}
