//! Live session driver.
//!
//! One task owns the controller. A 1 Hz interval and stdin commands are
//! consumed by the same `select!` loop, so every mutation finishes before
//! the next one starts.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use intervalo_core::{Event, Phase, SessionController};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::{load_config, load_plan};
use crate::host::{LogAlertHost, TerminalCues};

type Controller = SessionController<LogAlertHost, TerminalCues>;

#[derive(Args)]
pub struct RunArgs {
    /// Plan file (JSON)
    #[arg(long)]
    plan: PathBuf,
    /// Override the pre-countdown length in seconds (0 disables it)
    #[arg(long)]
    pre_countdown: Option<u32>,
    /// Override the "almost done" threshold in seconds
    #[arg(long)]
    warning: Option<u64>,
    /// Disable sound cues
    #[arg(long)]
    no_sound: bool,
    /// Disable vibration cues
    #[arg(long)]
    no_vibration: bool,
}

/// A line typed on stdin while the session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Pause,
    Resume,
    Next,
    Back,
    Stop,
}

impl Command {
    fn parse(input: &str) -> Option<Self> {
        match input {
            "p" | "pause" => Some(Self::Pause),
            "r" | "resume" => Some(Self::Resume),
            "n" | "next" => Some(Self::Next),
            "b" | "back" => Some(Self::Back),
            "q" | "quit" | "stop" => Some(Self::Stop),
            _ => None,
        }
    }

    /// Alerts are rescheduled from "now" after these, so the tick cadence
    /// restarts from "now" too.
    fn restarts_tick(self) -> bool {
        matches!(self, Self::Resume | Self::Next | Self::Back)
    }
}

pub fn run(args: RunArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    if let Some(pre) = args.pre_countdown {
        config.session.pre_countdown_seconds = pre;
    }
    if let Some(warning) = args.warning {
        config.session.warning_seconds_before_end = warning;
    }
    if args.no_sound {
        config.cues.enable_sounds = false;
    }
    if args.no_vibration {
        config.cues.enable_vibration = false;
    }
    config.validate()?;

    let plan = Arc::new(load_plan(&args.plan)?);
    let mut ctl = SessionController::new(
        LogAlertHost::default(),
        TerminalCues,
        config.settings(),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let result: Result<(), Box<dyn std::error::Error>> = runtime.block_on(async move {
        let started = ctl.start(plan)?;
        emit(&started)?;
        emit_state(&ctl)?;
        drive(&mut ctl).await
    });
    // The stdin reader blocks on a read that may never return.
    runtime.shutdown_background();
    result
}

async fn drive(ctl: &mut Controller) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, mut rx) = mpsc::channel(16);
    tokio::spawn(read_commands(tx));
    let mut stdin_open = true;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    while !matches!(ctl.phase(), Phase::Complete | Phase::Idle) {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(event) = ctl.tick() {
                    emit(&event)?;
                }
                emit_state(ctl)?;
            }
            cmd = rx.recv(), if stdin_open => match cmd {
                Some(cmd) => {
                    match apply(ctl, cmd) {
                        Some(event) => {
                            if cmd.restarts_tick() {
                                ticker.reset();
                            }
                            emit(&event)?;
                        }
                        None => tracing::info!(?cmd, phase = ?ctl.phase(), "ignored"),
                    }
                    emit_state(ctl)?;
                }
                None => stdin_open = false,
            },
        }
    }

    if ctl.alerts_degraded() {
        tracing::warn!("background alerts could not be registered during this session");
    }
    Ok(())
}

fn apply(ctl: &mut Controller, cmd: Command) -> Option<Event> {
    match cmd {
        Command::Pause => ctl.pause(),
        Command::Resume => ctl.resume(),
        Command::Next => ctl.skip_forward(),
        Command::Back => ctl.skip_backward(),
        Command::Stop => ctl.stop(),
    }
}

async fn read_commands(tx: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match Command::parse(input) {
            Some(cmd) => {
                if tx.send(cmd).await.is_err() {
                    break;
                }
            }
            None => tracing::warn!(input, "unknown command (p, r, n, b, q)"),
        }
    }
}

fn emit(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn emit_state(ctl: &Controller) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ctl.engine();
    let line = serde_json::json!({
        "type": "state",
        "state": ctl.snapshot(),
        "segment": engine.current_segment().map(|s| s.label.as_str()),
        "session_progress_pct": engine.session_progress_pct(),
    });
    println!("{line}");
    Ok(())
}
