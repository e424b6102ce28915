//! Timer engine task.
//!
//! The engine owns the [`TimerSession`] and every deferred callback that can
//! touch it: the one-second tick loop, the pending short-break cue and the
//! quiet window that follows a cue. All of them are polled from a single
//! `select!` loop, so commands and timer fires are strictly serialized and a
//! command handler can cancel a timer simply by dropping it.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = TimerEngine::new(Arc::new(SystemClock));
//! let link = timer::spawn(engine);
//! link.commands.send(Command::StartFocus(request))?;
//! while let Some(event) = link.events.recv().await { /* ... */ }
//! ```

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::time::{self, Interval, MissedTickBehavior, Sleep};

use super::clock::Clock;
use super::interval::random_interval_secs;
use super::session::{Phase, TimerSession};
use crate::error::{CoreError, Result};
use crate::protocol::{Command, Cue, CueNotice, EngineEvent, TimerView, TimingSettings};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Delay between a short-break cue and drawing the next interval.
pub const SHORT_BREAK_QUIET_WINDOW: Duration = Duration::from_secs(10);

/// Deferred work owned by the engine loop. Dropping a field cancels it.
#[derive(Default)]
struct Timers {
    tick: Option<Interval>,
    short_break: Option<Pin<Box<Sleep>>>,
    quiet_window: Option<Pin<Box<Sleep>>>,
}

impl Timers {
    fn cancel_short_break(&mut self) {
        self.short_break = None;
        self.quiet_window = None;
    }

    fn cancel_all(&mut self) {
        self.tick = None;
        self.cancel_short_break();
    }
}

pub struct TimerEngine {
    session: TimerSession,
    settings: TimingSettings,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    tick_every: Duration,
    quiet_window: Duration,
}

impl TimerEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            session: TimerSession::new(),
            settings: TimingSettings::default(),
            clock,
            rng: StdRng::from_entropy(),
            tick_every: TICK_INTERVAL,
            quiet_window: SHORT_BREAK_QUIET_WINDOW,
        }
    }

    /// Fixed random source, for reproducible short-break draws.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_settings(mut self, settings: TimingSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    fn view(&self) -> TimerView {
        TimerView {
            phase: self.session.phase(),
            time_remaining: self.session.remaining_secs(self.clock.now_ms()),
            running: self.session.is_running(),
        }
    }

    /// Runs until the command channel closes.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) {
        let mut timers = Timers::default();
        emit(&events, EngineEvent::Ready(self.view()));

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command, &mut timers, &events),
                    None => break,
                },
                _ = next_tick(&mut timers.tick) => self.on_tick(&mut timers, &events),
                _ = fire(&mut timers.short_break) => {
                    timers.short_break = None;
                    self.on_short_break(&mut timers, &events);
                }
                _ = fire(&mut timers.quiet_window) => {
                    timers.quiet_window = None;
                    self.on_quiet_window_elapsed(&mut timers);
                }
            }
        }

        debug!("timer engine stopped: command channel closed");
    }

    fn handle_command(
        &mut self,
        command: Command,
        timers: &mut Timers,
        events: &mpsc::UnboundedSender<EngineEvent>,
    ) {
        let now = self.clock.now_ms();
        let name = command.name();

        let applied = match command {
            Command::StartFocus(request) => {
                let started = self.session.start_focus(request.focus_duration_minutes, now);
                if started {
                    self.settings.focus_duration_minutes = request.focus_duration_minutes;
                    self.settings.short_break_min_interval_minutes = request.short_break_min_interval_minutes;
                    self.settings.short_break_max_interval_minutes = request.short_break_max_interval_minutes;
                    info!("focus started: {} min", request.focus_duration_minutes);
                    timers.cancel_all();
                    self.arm_short_break(timers, now);
                    timers.tick = Some(self.ticker());
                }
                started
            }
            Command::StartLongBreak(request) => {
                let started = self.session.start_long_break(request.long_break_duration_minutes, now);
                if started {
                    self.settings.long_break_duration_minutes = request.long_break_duration_minutes;
                    info!("long break started: {} min", request.long_break_duration_minutes);
                    timers.cancel_all();
                    timers.tick = Some(self.ticker());
                }
                started
            }
            Command::Pause => {
                let paused = self.session.pause(now);
                if paused {
                    timers.cancel_all();
                    emit(events, EngineEvent::TickUpdate(self.view()));
                }
                paused
            }
            Command::Resume => {
                let resumed = self.session.resume(now);
                if resumed {
                    timers.cancel_all();
                    self.arm_short_break(timers, now);
                    timers.tick = Some(self.ticker());
                }
                resumed
            }
            Command::Reset => {
                self.session.reset();
                timers.cancel_all();
                emit(events, EngineEvent::TickUpdate(self.view()));
                true
            }
            Command::UpdateSettings(settings) => {
                // An armed short break keeps its countdown; new bounds apply
                // from the next draw.
                self.settings = settings;
                true
            }
        };

        if applied {
            debug!("{name} applied, phase now {:?}", self.session.phase());
        } else {
            debug!("{name} ignored in phase {:?}", self.session.phase());
        }
    }

    /// First tick fires immediately so the bridge sees the new state at once.
    fn ticker(&self) -> Interval {
        let mut interval = time::interval(self.tick_every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    }

    fn arm_short_break(&mut self, timers: &mut Timers, now: u64) {
        if !self.session.short_breaks_due() {
            return;
        }
        let secs = random_interval_secs(
            &mut self.rng,
            self.settings.short_break_min_interval_minutes,
            self.settings.short_break_max_interval_minutes,
        );
        self.session.set_next_short_break_at(now.saturating_add(secs * 1000));
        timers.quiet_window = None;
        timers.short_break = Some(Box::pin(time::sleep(Duration::from_secs(secs))));
        debug!("next short break in {secs}s");
    }

    fn on_tick(&mut self, timers: &mut Timers, events: &mpsc::UnboundedSender<EngineEvent>) {
        if !self.session.is_counting() {
            timers.tick = None;
            return;
        }

        let now = self.clock.now_ms();
        if let Some(done) = self.session.complete_if_elapsed(now) {
            timers.cancel_all();
            info!("{} reached", done.label());
            emit(
                events,
                EngineEvent::PhaseComplete(CueNotice {
                    phase: done,
                    time_remaining: 0,
                    cue: Cue::End,
                }),
            );
            return;
        }

        emit(events, EngineEvent::TickUpdate(self.view()));
    }

    fn on_short_break(&mut self, timers: &mut Timers, events: &mpsc::UnboundedSender<EngineEvent>) {
        if !self.session.short_breaks_due() {
            return;
        }

        let now = self.clock.now_ms();
        emit(
            events,
            EngineEvent::ShortBreakCue(CueNotice {
                phase: Phase::Focusing,
                time_remaining: self.session.remaining_secs(now),
                cue: Cue::ShortBreak,
            }),
        );

        let quiet_ms = self.quiet_window.as_millis() as u64;
        self.session.set_next_short_break_at(now.saturating_add(quiet_ms));
        timers.quiet_window = Some(Box::pin(time::sleep(self.quiet_window)));
    }

    fn on_quiet_window_elapsed(&mut self, timers: &mut Timers) {
        if !self.session.short_breaks_due() {
            return;
        }
        let now = self.clock.now_ms();
        self.arm_short_break(timers, now);
    }
}

/// The engine's end of the channels.
pub struct EngineLink {
    pub commands: mpsc::UnboundedSender<Command>,
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
}

/// Spawns the engine on the current tokio runtime.
pub fn spawn(engine: TimerEngine) -> EngineLink {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    tokio::spawn(engine.run(command_rx, event_tx));
    EngineLink {
        commands: command_tx,
        events: event_rx,
    }
}

/// Runs the engine on its own OS thread with a dedicated single-threaded
/// runtime, so it keeps ticking however busy or throttled the caller is.
///
/// # Errors
///
/// Returns `EngineUnavailable` if the runtime or the thread cannot be created.
pub fn spawn_isolated(engine: TimerEngine) -> Result<EngineLink> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| CoreError::EngineUnavailable(format!("runtime: {e}")))?;

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    std::thread::Builder::new()
        .name("timer-engine".to_string())
        .spawn(move || runtime.block_on(engine.run(command_rx, event_tx)))
        .map_err(|e| CoreError::EngineUnavailable(format!("thread: {e}")))?;

    Ok(EngineLink {
        commands: command_tx,
        events: event_rx,
    })
}

fn emit(events: &mpsc::UnboundedSender<EngineEvent>, event: EngineEvent) {
    if events.send(event).is_err() {
        debug!("event dropped, bridge is gone");
    }
}

async fn next_tick(tick: &mut Option<Interval>) {
    match tick {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}

async fn fire(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}
