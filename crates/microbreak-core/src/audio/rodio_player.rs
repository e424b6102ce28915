use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread;

use log::{error, warn};
use rodio::{Decoder, OutputStream, Sink};

use super::{find_sound, AudioPlayer};
use crate::error::AudioError;

struct PlayRequest {
    path: PathBuf,
    volume: f32,
}

/// Plays catalogue sounds from `sound_dir` on the default output device.
///
/// The output stream is not `Send`, so it lives on a dedicated thread that
/// receives play requests over a channel. Each cue gets its own detached sink,
/// letting an end cue overlap a short-break cue.
pub struct RodioPlayer {
    sound_dir: PathBuf,
    tx: Mutex<Sender<PlayRequest>>,
}

impl RodioPlayer {
    pub fn new(sound_dir: impl Into<PathBuf>) -> Result<Self, AudioError> {
        let (tx, rx) = mpsc::channel::<PlayRequest>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        thread::Builder::new()
            .name("audio-cues".to_string())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(pair) => {
                        let _ = ready_tx.send(Ok(()));
                        pair
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(format!("Failed to create audio output stream: {e}")));
                        return;
                    }
                };

                while let Ok(request) = rx.recv() {
                    let played = File::open(&request.path)
                        .map_err(|e| e.to_string())
                        .and_then(|file| Decoder::new(BufReader::new(file)).map_err(|e| e.to_string()))
                        .and_then(|source| {
                            let sink = Sink::try_new(&handle).map_err(|e| e.to_string())?;
                            sink.set_volume(request.volume);
                            sink.append(source);
                            sink.detach();
                            Ok(())
                        });
                    if let Err(e) = played {
                        error!("Failed to play audio {}: {e}", request.path.display());
                    }
                }
            })
            .map_err(|e| AudioError::Backend(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|e| AudioError::Backend(e.to_string()))?
            .map_err(AudioError::Backend)?;

        Ok(Self {
            sound_dir: sound_dir.into(),
            tx: Mutex::new(tx),
        })
    }

    fn asset_path(&self, sound_id: &str) -> Option<PathBuf> {
        find_sound(sound_id).map(|sound| self.sound_dir.join(sound.file))
    }

    pub fn sound_dir(&self) -> &Path {
        &self.sound_dir
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&self, sound_id: &str, volume: f32) -> Result<(), AudioError> {
        let path = self
            .asset_path(sound_id)
            .ok_or_else(|| AudioError::UnknownSound(sound_id.to_string()))?;
        let tx = self.tx.lock().map_err(|e| AudioError::Backend(e.to_string()))?;
        tx.send(PlayRequest {
            path,
            volume: volume.clamp(0.0, 1.0),
        })
        .map_err(|e| AudioError::Backend(e.to_string()))
    }

    fn preload(&self, sound_ids: &[&str]) {
        for id in sound_ids {
            match self.asset_path(id) {
                Some(path) if path.is_file() => {}
                Some(path) => warn!("Audio file missing for sound '{id}': {}", path.display()),
                None => warn!("Audio file not found for sound '{id}'"),
            }
        }
    }
}
