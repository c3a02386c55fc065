//! # Intervalo Core Library
//!
//! Core logic for the Intervalo interval timer: users assemble ordered
//! sequences of timed segments and run them with a live countdown,
//! foreground cues and background alerts.
//!
//! ## Architecture
//!
//! - **Plan**: immutable segment sequences and the single duration resolver
//! - **Timer Engine**: a tick-driven state machine; the caller invokes
//!   `tick()` once per second
//! - **Notify**: absolute-time alert computation and replace-all
//!   registration with a host capability
//! - **Session**: controller that keeps alerts and cues in step with the
//!   engine
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core session state machine
//! - [`NotificationScheduler`]: Background alert registration
//! - [`SessionController`]: Engine + scheduler + cues
//! - [`Config`]: Settings file

pub mod clock;
pub mod config;
pub mod cues;
pub mod error;
pub mod events;
pub mod notify;
pub mod plan;
pub mod session;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, Settings};
pub use cues::{Cue, CueOutput, CueSink};
pub use error::{AlertHostError, ConfigError, CoreError, Result};
pub use events::Event;
pub use notify::{
    compute_alerts, AlertHost, AlertId, AlertKind, MemoryAlertHost, NotificationScheduler,
    ScheduledAlert,
};
pub use plan::{resolved_duration, Segment, SegmentKind, SessionPlan, TimingMode};
pub use session::SessionController;
pub use timer::{Countdown, Phase, RunState, TimerEngine};
