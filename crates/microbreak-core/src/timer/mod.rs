mod clock;
mod engine;
mod interval;
mod session;

pub use clock::{Clock, SystemClock, TokioClock};
pub use engine::{
    spawn, spawn_isolated, EngineLink, TimerEngine, SHORT_BREAK_QUIET_WINDOW, TICK_INTERVAL,
};
pub use interval::{format_time, random_interval_secs};
pub use session::{minutes_to_secs, Phase, TimerSession};
