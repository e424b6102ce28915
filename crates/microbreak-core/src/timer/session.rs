//! The single timer session and its transitions.
//!
//! All timing is derived from absolute epoch-millisecond timestamps passed in
//! by the caller. Nothing here counts down: remaining time is recomputed from
//! the phase start, the accumulated pause time and "now" whenever it is asked
//! for, so a late caller simply observes a more advanced clock.
//!
//! ## Phases
//!
//! ```text
//! Idle | FocusComplete | LongBreakComplete --StartFocus-->     Focusing
//! FocusComplete                            --StartLongBreak--> LongBreak
//! Focusing  --(countdown reaches 0)--> FocusComplete
//! LongBreak --(countdown reaches 0)--> LongBreakComplete
//! any       --Reset-->                 Idle
//! ```
//!
//! Pause/Resume toggle `running` inside `Focusing` and `LongBreak` only.
//!
//! Transition methods return `true` when applied and `false` when the command
//! does not apply to the current phase; rejected commands leave the session
//! untouched.

use serde::{Deserialize, Serialize};

/// The engine's discrete mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Idle,
    Focusing,
    LongBreak,
    FocusComplete,
    LongBreakComplete,
}

impl Phase {
    /// Phases with a countdown (running or paused).
    pub fn is_timed(self) -> bool {
        matches!(self, Phase::Focusing | Phase::LongBreak)
    }

    pub fn accepts_focus_start(self) -> bool {
        matches!(
            self,
            Phase::Idle | Phase::FocusComplete | Phase::LongBreakComplete
        )
    }

    pub fn accepts_long_break_start(self) -> bool {
        self == Phase::FocusComplete
    }

    /// The phase a timed phase moves to when its countdown reaches zero.
    fn completed(self) -> Option<Phase> {
        match self {
            Phase::Focusing => Some(Phase::FocusComplete),
            Phase::LongBreak => Some(Phase::LongBreakComplete),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Focusing => "focusing",
            Phase::LongBreak => "long break",
            Phase::FocusComplete => "focus complete",
            Phase::LongBreakComplete => "long break complete",
        }
    }
}

/// Whole minutes to seconds.
pub fn minutes_to_secs(minutes: u32) -> u64 {
    u64::from(minutes) * 60
}

/// The single active timer session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimerSession {
    phase: Phase,
    running: bool,
    /// Logical start of the current phase (epoch ms).
    started_at: Option<u64>,
    /// Milliseconds spent paused since `started_at`.
    accumulated_pause_ms: u64,
    /// Start of the current pause (epoch ms); `None` while running.
    pause_started_at: Option<u64>,
    /// Frozen at phase start.
    target_duration_secs: u64,
    /// Next short-break scheduling instant (epoch ms). Only set while focusing
    /// and running; during the quiet window after a cue it holds the instant
    /// the next interval will be drawn.
    next_short_break_at: Option<u64>,
}

impl TimerSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn started_at(&self) -> Option<u64> {
        self.started_at
    }

    pub fn accumulated_pause_ms(&self) -> u64 {
        self.accumulated_pause_ms
    }

    pub fn pause_started_at(&self) -> Option<u64> {
        self.pause_started_at
    }

    pub fn target_duration_secs(&self) -> u64 {
        self.target_duration_secs
    }

    pub fn next_short_break_at(&self) -> Option<u64> {
        self.next_short_break_at
    }

    /// A timed phase whose clock is currently advancing.
    pub fn is_counting(&self) -> bool {
        self.phase.is_timed() && self.running
    }

    /// Short breaks are only scheduled while focusing and running.
    pub fn short_breaks_due(&self) -> bool {
        self.phase == Phase::Focusing && self.running
    }

    /// Whole seconds of running time since the phase started. While paused the
    /// pause instant stands in for `now`.
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        let Some(start) = self.started_at else {
            return 0;
        };
        let until = self.pause_started_at.unwrap_or(now_ms);
        until
            .saturating_sub(start)
            .saturating_sub(self.accumulated_pause_ms)
            / 1000
    }

    pub fn remaining_secs(&self, now_ms: u64) -> u64 {
        if !self.phase.is_timed() {
            return 0;
        }
        self.target_duration_secs
            .saturating_sub(self.elapsed_secs(now_ms))
    }

    // ── Transitions ──────────────────────────────────────────────────

    pub fn start_focus(&mut self, focus_minutes: u32, now_ms: u64) -> bool {
        if !self.phase.accepts_focus_start() {
            return false;
        }
        self.begin(Phase::Focusing, minutes_to_secs(focus_minutes), now_ms);
        true
    }

    pub fn start_long_break(&mut self, long_break_minutes: u32, now_ms: u64) -> bool {
        if !self.phase.accepts_long_break_start() {
            return false;
        }
        self.begin(Phase::LongBreak, minutes_to_secs(long_break_minutes), now_ms);
        true
    }

    pub fn pause(&mut self, now_ms: u64) -> bool {
        if !self.is_counting() {
            return false;
        }
        self.running = false;
        self.pause_started_at = Some(now_ms);
        self.next_short_break_at = None;
        true
    }

    pub fn resume(&mut self, now_ms: u64) -> bool {
        if !self.phase.is_timed() || self.running {
            return false;
        }
        self.running = true;
        if let Some(paused_at) = self.pause_started_at.take() {
            self.accumulated_pause_ms = self
                .accumulated_pause_ms
                .saturating_add(now_ms.saturating_sub(paused_at));
        }
        true
    }

    /// Back to `Idle`, every timestamp cleared.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Completes the running phase once its countdown has reached zero.
    /// Returns the phase entered.
    pub fn complete_if_elapsed(&mut self, now_ms: u64) -> Option<Phase> {
        if !self.is_counting() || self.remaining_secs(now_ms) > 0 {
            return None;
        }
        let done = self.phase.completed()?;
        self.phase = done;
        self.running = false;
        self.next_short_break_at = None;
        Some(done)
    }

    /// Records the next short-break instant. Refused unless focusing and
    /// running, so the field can never outlive the state it belongs to.
    pub fn set_next_short_break_at(&mut self, at_ms: u64) -> bool {
        if !self.short_breaks_due() {
            return false;
        }
        self.next_short_break_at = Some(at_ms);
        true
    }

    fn begin(&mut self, phase: Phase, target_duration_secs: u64, now_ms: u64) {
        *self = Self {
            phase,
            running: true,
            started_at: Some(now_ms),
            accumulated_pause_ms: 0,
            pause_started_at: None,
            target_duration_secs,
            next_short_break_at: None,
        };
    }
}
