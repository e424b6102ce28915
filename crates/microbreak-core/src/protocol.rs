//! Messages exchanged between the bridge and the timer engine.
//!
//! Both directions use the same JSON shape, `{"type": "...", "data": {...}}`,
//! with camelCase payload fields. In-process they travel as typed values over
//! ordered channels; the serde form is what the CLI prints with `--json`.

use serde::{Deserialize, Serialize};

use crate::storage::Settings;
use crate::timer::Phase;

/// Bridge → engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    StartFocus(FocusRequest),
    StartLongBreak(LongBreakRequest),
    Pause,
    Resume,
    Reset,
    UpdateSettings(TimingSettings),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::StartFocus(_) => "START_FOCUS",
            Command::StartLongBreak(_) => "START_LONG_BREAK",
            Command::Pause => "PAUSE",
            Command::Resume => "RESUME",
            Command::Reset => "RESET",
            Command::UpdateSettings(_) => "UPDATE_SETTINGS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusRequest {
    pub focus_duration_minutes: u32,
    pub short_break_min_interval_minutes: u32,
    pub short_break_max_interval_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongBreakRequest {
    pub long_break_duration_minutes: u32,
}

/// The timing half of [`Settings`]; sound choices never reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingSettings {
    pub focus_duration_minutes: u32,
    pub short_break_min_interval_minutes: u32,
    pub short_break_max_interval_minutes: u32,
    pub long_break_duration_minutes: u32,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for TimingSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            focus_duration_minutes: settings.focus_duration_minutes,
            short_break_min_interval_minutes: settings.short_break_min_interval_minutes,
            short_break_max_interval_minutes: settings.short_break_max_interval_minutes,
            long_break_duration_minutes: settings.long_break_duration_minutes,
        }
    }
}

impl From<&Settings> for FocusRequest {
    fn from(settings: &Settings) -> Self {
        Self {
            focus_duration_minutes: settings.focus_duration_minutes,
            short_break_min_interval_minutes: settings.short_break_min_interval_minutes,
            short_break_max_interval_minutes: settings.short_break_max_interval_minutes,
        }
    }
}

impl From<&Settings> for LongBreakRequest {
    fn from(settings: &Settings) -> Self {
        Self {
            long_break_duration_minutes: settings.long_break_duration_minutes,
        }
    }
}

/// Sound cue carried by an event. Not a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cue {
    ShortBreak,
    End,
}

impl Cue {
    /// Playback volume for the cue, 0..1.
    pub fn volume(self) -> f32 {
        match self {
            Cue::ShortBreak => 0.6,
            Cue::End => 0.7,
        }
    }
}

/// What the bridge mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub phase: Phase,
    pub time_remaining: u64,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueNotice {
    pub phase: Phase,
    pub time_remaining: u64,
    pub cue: Cue,
}

/// Engine → bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineEvent {
    /// Sent once when the engine starts.
    Ready(TimerView),
    /// Once a second while running, and after Pause/Reset.
    TickUpdate(TimerView),
    /// Random short break; the phase stays `Focusing`.
    ShortBreakCue(CueNotice),
    /// A timed phase reached zero.
    PhaseComplete(CueNotice),
}

impl EngineEvent {
    /// The state the event reports.
    pub fn view(&self) -> TimerView {
        match *self {
            EngineEvent::Ready(view) | EngineEvent::TickUpdate(view) => view,
            EngineEvent::ShortBreakCue(notice) => TimerView {
                phase: notice.phase,
                time_remaining: notice.time_remaining,
                running: true,
            },
            EngineEvent::PhaseComplete(notice) => TimerView {
                phase: notice.phase,
                time_remaining: 0,
                running: false,
            },
        }
    }

    pub fn cue(&self) -> Option<Cue> {
        match self {
            EngineEvent::ShortBreakCue(notice) | EngineEvent::PhaseComplete(notice) => {
                Some(notice.cue)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn commands_use_screaming_type_tags() {
        let command = Command::StartFocus(FocusRequest {
            focus_duration_minutes: 60,
            short_break_min_interval_minutes: 5,
            short_break_max_interval_minutes: 8,
        });
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({
                "type": "START_FOCUS",
                "data": {
                    "focusDurationMinutes": 60,
                    "shortBreakMinIntervalMinutes": 5,
                    "shortBreakMaxIntervalMinutes": 8
                }
            })
        );
        assert_eq!(
            serde_json::to_value(Command::Pause).unwrap(),
            json!({ "type": "PAUSE" })
        );
    }

    #[test]
    fn parses_bare_commands() {
        let reset: Command = serde_json::from_value(json!({ "type": "RESET" })).unwrap();
        assert_eq!(reset, Command::Reset);
        let long: Command = serde_json::from_value(json!({
            "type": "START_LONG_BREAK",
            "data": { "longBreakDurationMinutes": 10 }
        }))
        .unwrap();
        assert_eq!(
            long,
            Command::StartLongBreak(LongBreakRequest {
                long_break_duration_minutes: 10
            })
        );
    }

    #[test]
    fn cue_events_carry_cue_names() {
        let event = EngineEvent::ShortBreakCue(CueNotice {
            phase: Phase::Focusing,
            time_remaining: 420,
            cue: Cue::ShortBreak,
        });
        assert_eq!(
            serde_json::to_value(event).unwrap(),
            json!({
                "type": "SHORT_BREAK_CUE",
                "data": { "phase": "focusing", "timeRemaining": 420, "cue": "shortBreak" }
            })
        );

        let done = EngineEvent::PhaseComplete(CueNotice {
            phase: Phase::LongBreakComplete,
            time_remaining: 0,
            cue: Cue::End,
        });
        assert_eq!(
            serde_json::to_value(done).unwrap()["data"],
            json!({ "phase": "longBreakComplete", "timeRemaining": 0, "cue": "end" })
        );
        assert_eq!(done.cue(), Some(Cue::End));
        assert!(!done.view().running);
    }

    #[test]
    fn tick_updates_have_no_cue() {
        let tick = EngineEvent::TickUpdate(TimerView {
            phase: Phase::LongBreak,
            time_remaining: 12,
            running: true,
        });
        assert_eq!(tick.cue(), None);
        assert_eq!(tick.view().time_remaining, 12);
    }
}
