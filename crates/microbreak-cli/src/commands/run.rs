//! Interactive session: engine events on stdout, commands from stdin.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use log::warn;
use microbreak_core::audio::{AudioPlayer, NullPlayer};
use microbreak_core::protocol::{EngineEvent, TimingSettings};
use microbreak_core::timer::{self, format_time, SystemClock, TimerEngine};
use microbreak_core::{Bridge, SettingsStore, TomlSettingsStore};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: focus | break | pause | resume | reset | status | set KEY VALUE | help | quit";

#[derive(Args)]
pub struct RunArgs {
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
    /// Directory holding the cue sound files
    #[arg(long, value_name = "DIR")]
    sounds_dir: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args))
}

async fn session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = TomlSettingsStore::open_default()?;
    let timing = TimingSettings::from(&store.load().unwrap_or_default());

    // The engine gets its own thread so slow stdout never delays a tick.
    let engine = TimerEngine::new(Arc::new(SystemClock)).with_settings(timing);
    let link = timer::spawn_isolated(engine);
    let mut bridge = Bridge::new(link, Box::new(store), player(args.sounds_dir.as_deref()));

    if !args.json {
        println!("{HELP}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !handle_line(&mut bridge, line.trim(), args.json)? {
                        break;
                    }
                }
                None => break,
            },
            event = bridge.next_event(), if !bridge.is_disabled() => {
                if let Some(event) = event {
                    print_event(&bridge, &event, args.json)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(feature = "playback")]
fn player(sounds_dir: Option<&std::path::Path>) -> Box<dyn AudioPlayer> {
    let Some(dir) = sounds_dir else {
        return Box::new(NullPlayer);
    };
    match microbreak_core::audio::RodioPlayer::new(dir) {
        Ok(player) => Box::new(player),
        Err(e) => {
            warn!("audio output unavailable, cues will be silent: {e}");
            Box::new(NullPlayer)
        }
    }
}

#[cfg(not(feature = "playback"))]
fn player(sounds_dir: Option<&std::path::Path>) -> Box<dyn AudioPlayer> {
    if sounds_dir.is_some() {
        warn!("built without the `playback` feature, ignoring --sounds-dir");
    }
    Box::new(NullPlayer)
}

/// Returns `false` when the session should end.
fn handle_line(bridge: &mut Bridge, line: &str, json: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(true);
    };

    match command {
        "focus" => bridge.start_focus(),
        "break" => bridge.start_long_break(),
        "pause" => bridge.pause(),
        "resume" => bridge.resume(),
        "reset" => bridge.reset(),
        "status" => {
            if json {
                println!("{}", serde_json::to_string(&bridge.view())?);
            } else {
                println!("{}", status_line(bridge));
            }
        }
        "set" => {
            let (Some(key), Some(value)) = (words.next(), words.next()) else {
                eprintln!("usage: set KEY VALUE");
                return Ok(true);
            };
            let mut settings = bridge.settings().clone();
            match settings.set(key, value) {
                Ok(()) => {
                    bridge.update_settings(settings)?;
                    if !json {
                        println!("{key} = {value}");
                    }
                }
                Err(e) => eprintln!("error: {e}"),
            }
        }
        "help" => println!("{HELP}"),
        "quit" | "exit" => return Ok(false),
        other => eprintln!("unknown command: {other} ({HELP})"),
    }
    Ok(true)
}

fn print_event(bridge: &Bridge, event: &EngineEvent, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match event {
        EngineEvent::Ready(_) => println!("timer ready"),
        EngineEvent::TickUpdate(_) => println!("{}", status_line(bridge)),
        EngineEvent::ShortBreakCue(notice) => println!(
            "short break! look away and breathe ({} left)",
            format_time(notice.time_remaining)
        ),
        EngineEvent::PhaseComplete(notice) => println!("{}", notice.phase.label()),
    }
    Ok(())
}

fn status_line(bridge: &Bridge) -> String {
    let mut line = format!(
        "[{}] {}",
        bridge.phase().label(),
        format_time(bridge.time_remaining())
    );
    if bridge.phase().is_timed() && !bridge.is_running() {
        line.push_str(" (paused)");
    }
    if bridge.show_short_break_hint() {
        line.push_str(" - short break");
    }
    line
}
