//! Client side of the timer engine.
//!
//! The bridge mirrors the engine's `{phase, time_remaining, running}`, maps
//! its methods one to one onto engine commands and turns cue events into
//! audio. It also owns the settings: they are loaded from the store when the
//! bridge is created, and every start command carries the current values.

use std::time::Duration;

use log::{debug, error, warn};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::Instant;

use crate::audio::AudioPlayer;
use crate::error::{AudioError, Result, ValidationError};
use crate::protocol::{
    Command, Cue, EngineEvent, FocusRequest, LongBreakRequest, TimerView, TimingSettings,
};
use crate::storage::{Settings, SettingsPatch, SettingsStore};
use crate::timer::{EngineLink, Phase};

/// How long the short-break hint stays up after a cue.
pub const SHORT_BREAK_HINT: Duration = Duration::from_millis(3000);

pub struct Bridge {
    link: Option<EngineLink>,
    view: TimerView,
    ready: bool,
    settings: Settings,
    store: Box<dyn SettingsStore>,
    player: Box<dyn AudioPlayer>,
    hint_until: Option<Instant>,
}

impl Bridge {
    /// Wraps a started engine. When the engine could not be started the
    /// bridge comes up disabled: every command is a no-op.
    pub fn new(
        link: Result<EngineLink>,
        store: Box<dyn SettingsStore>,
        player: Box<dyn AudioPlayer>,
    ) -> Self {
        let link = match link {
            Ok(link) => Some(link),
            Err(e) => {
                error!("timer engine unavailable, running disabled: {e}");
                None
            }
        };

        let settings = store.load().unwrap_or_default();
        let bridge = Self {
            link,
            view: TimerView::default(),
            ready: false,
            settings,
            store,
            player,
            hint_until: None,
        };
        bridge.preload_sounds();
        bridge
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// True once the engine's READY event has been received.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_disabled(&self) -> bool {
        self.link.is_none()
    }

    pub fn view(&self) -> TimerView {
        self.view
    }

    pub fn phase(&self) -> Phase {
        self.view.phase
    }

    pub fn time_remaining(&self) -> u64 {
        self.view.time_remaining
    }

    pub fn is_running(&self) -> bool {
        self.view.running
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// True for [`SHORT_BREAK_HINT`] after a short-break cue arrives.
    pub fn show_short_break_hint(&self) -> bool {
        self.hint_until
            .is_some_and(|deadline| Instant::now() < deadline)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_focus(&mut self) {
        self.send(Command::StartFocus(FocusRequest::from(&self.settings)));
    }

    pub fn start_long_break(&mut self) {
        self.send(Command::StartLongBreak(LongBreakRequest::from(
            &self.settings,
        )));
    }

    pub fn pause(&mut self) {
        self.send(Command::Pause);
    }

    pub fn resume(&mut self) {
        self.send(Command::Resume);
    }

    pub fn reset(&mut self) {
        self.send(Command::Reset);
    }

    /// Validates, persists and forwards new settings.
    ///
    /// Sound choices take effect on the next cue. Timing bounds reach the
    /// engine at once but an already armed short break keeps its countdown.
    /// A failed save is logged; the settings still apply to this session.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field; nothing changes in that case.
    pub fn update_settings(&mut self, settings: Settings) -> std::result::Result<(), ValidationError> {
        settings.validate()?;

        let sounds_changed = settings.short_break_sound != self.settings.short_break_sound
            || settings.end_sound != self.settings.end_sound;
        self.settings = settings;

        if let Err(e) = self.store.save(&self.settings) {
            error!("failed to save settings: {e}");
        }
        self.send(Command::UpdateSettings(TimingSettings::from(&self.settings)));
        if sounds_changed {
            self.preload_sounds();
        }
        Ok(())
    }

    /// Merges `patch` over the current settings, then applies the result
    /// like [`Bridge::update_settings`].
    ///
    /// # Errors
    ///
    /// Returns the first invalid field of the merged settings.
    pub fn apply_patch(&mut self, patch: SettingsPatch) -> std::result::Result<(), ValidationError> {
        let merged = self.settings.merged(patch);
        self.update_settings(merged)
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Waits for the next engine event and applies it to the mirror.
    ///
    /// Returns `None` when the bridge is disabled or the engine has gone
    /// away; the bridge is disabled from then on.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        let link = self.link.as_mut()?;
        match link.events.recv().await {
            Some(event) => {
                self.handle_event(event);
                Some(event)
            }
            None => {
                self.disable("event channel closed");
                None
            }
        }
    }

    /// Applies every event already queued, without waiting.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        let mut drained = Vec::new();
        while let Some(link) = self.link.as_mut() {
            match link.events.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    drained.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disable("event channel closed");
                    break;
                }
            }
        }
        drained
    }

    fn handle_event(&mut self, event: EngineEvent) {
        if matches!(event, EngineEvent::Ready(_)) {
            self.ready = true;
        }
        self.view = event.view();

        if let Some(cue) = event.cue() {
            if cue == Cue::ShortBreak {
                self.hint_until = Some(Instant::now() + SHORT_BREAK_HINT);
            }
            self.play_cue(cue);
        }
    }

    /// Plays the sound currently configured for `cue`. Never fails.
    fn play_cue(&self, cue: Cue) {
        let sound = self.settings.sound_for(cue);
        match self.player.play(sound, cue.volume()) {
            Ok(()) => debug!("played {sound} for {cue:?}"),
            Err(AudioError::UnknownSound(id)) => warn!("no sound registered for '{id}'"),
            Err(e) => error!("failed to play {sound}: {e}"),
        }
    }

    fn preload_sounds(&self) {
        self.player.preload(&[
            self.settings.short_break_sound.as_str(),
            self.settings.end_sound.as_str(),
        ]);
    }

    fn send(&mut self, command: Command) {
        let Some(link) = self.link.as_ref() else {
            debug!("{} dropped, bridge disabled", command.name());
            return;
        };
        if link.commands.send(command).is_err() {
            self.disable("command channel closed");
        }
    }

    fn disable(&mut self, reason: &str) {
        if self.link.take().is_some() {
            error!("timer engine stopped ({reason}), bridge disabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc;

    use super::*;
    use crate::error::CoreError;
    use crate::protocol::CueNotice;
    use crate::storage::MemorySettingsStore;

    type Played = Arc<Mutex<Vec<(String, f32)>>>;

    struct Recorder(Played);

    impl AudioPlayer for Recorder {
        fn play(&self, sound_id: &str, volume: f32) -> std::result::Result<(), AudioError> {
            self.0.lock().unwrap().push((sound_id.to_string(), volume));
            Ok(())
        }
    }

    /// Bridge wired to hand-held channels instead of a running engine.
    fn wired() -> (
        Bridge,
        mpsc::UnboundedReceiver<Command>,
        mpsc::UnboundedSender<EngineEvent>,
        Played,
    ) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let played = Played::default();
        let bridge = Bridge::new(
            Ok(EngineLink {
                commands: command_tx,
                events: event_rx,
            }),
            Box::new(MemorySettingsStore::new()),
            Box::new(Recorder(played.clone())),
        );
        (bridge, command_rx, event_tx, played)
    }

    #[test]
    fn start_commands_carry_current_settings() {
        let (mut bridge, mut commands, _events, _) = wired();
        bridge
            .apply_patch(SettingsPatch {
                focus_duration_minutes: Some(25),
                ..Default::default()
            })
            .unwrap();
        bridge.start_focus();
        bridge.start_long_break();

        assert!(matches!(commands.try_recv(), Ok(Command::UpdateSettings(_))));
        assert_eq!(
            commands.try_recv().unwrap(),
            Command::StartFocus(FocusRequest {
                focus_duration_minutes: 25,
                short_break_min_interval_minutes: 5,
                short_break_max_interval_minutes: 8,
            })
        );
        assert_eq!(
            commands.try_recv().unwrap(),
            Command::StartLongBreak(LongBreakRequest {
                long_break_duration_minutes: 10
            })
        );
    }

    #[test]
    fn invalid_settings_are_rejected_untouched() {
        let (mut bridge, mut commands, _events, _) = wired();
        let result = bridge.apply_patch(SettingsPatch {
            short_break_min_interval_minutes: Some(9),
            short_break_max_interval_minutes: Some(2),
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(ValidationError::IntervalBoundsInverted { .. })
        ));
        assert_eq!(bridge.settings(), &Settings::default());
        assert!(commands.try_recv().is_err());
    }

    #[test]
    fn mirror_follows_events() {
        let (mut bridge, _commands, events, played) = wired();
        assert!(!bridge.is_ready());

        events.send(EngineEvent::Ready(TimerView::default())).unwrap();
        events
            .send(EngineEvent::TickUpdate(TimerView {
                phase: Phase::Focusing,
                time_remaining: 1500,
                running: true,
            }))
            .unwrap();
        assert_eq!(bridge.drain_events().len(), 2);

        assert!(bridge.is_ready());
        assert_eq!(bridge.phase(), Phase::Focusing);
        assert_eq!(bridge.time_remaining(), 1500);
        assert!(bridge.is_running());
        assert!(played.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn short_break_cue_plays_sound_and_raises_hint() {
        let (mut bridge, _commands, events, played) = wired();
        events
            .send(EngineEvent::ShortBreakCue(CueNotice {
                phase: Phase::Focusing,
                time_remaining: 420,
                cue: Cue::ShortBreak,
            }))
            .unwrap();
        bridge.next_event().await.unwrap();

        assert!(bridge.show_short_break_hint());
        assert_eq!(bridge.phase(), Phase::Focusing);
        assert_eq!(
            played.lock().unwrap().as_slice(),
            &[("bell-soft".to_string(), 0.6)]
        );

        tokio::time::advance(SHORT_BREAK_HINT).await;
        assert!(!bridge.show_short_break_hint());
    }

    #[test]
    fn unavailable_engine_disables_bridge() {
        let mut bridge = Bridge::new(
            Err(CoreError::EngineUnavailable("no threads".into())),
            Box::new(MemorySettingsStore::new()),
            Box::new(crate::audio::NullPlayer),
        );
        assert!(bridge.is_disabled());
        bridge.start_focus();
        bridge.pause();
        assert!(bridge.drain_events().is_empty());
        assert_eq!(bridge.view(), TimerView::default());
    }

    #[test]
    fn closed_engine_disables_bridge() {
        let (mut bridge, commands, events, _) = wired();
        drop(commands);
        drop(events);
        bridge.start_focus();
        assert!(bridge.is_disabled());
    }
}
