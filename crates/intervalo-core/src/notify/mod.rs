//! Background alert scheduling.
//!
//! Alerts must fire even when the process driving the engine is suspended,
//! so every future alert is computed up front as an absolute timestamp and
//! handed to a host capability. Any engine mutation invalidates the whole
//! set; it is recomputed and replaced, never patched.

mod alert;
mod host;
mod scheduler;

pub use alert::{compute_alerts, warns_for, AlertKind, ScheduledAlert, WARNING_MIN_SEGMENT_SECS};
pub use host::{AlertHost, AlertId, MemoryAlertHost};
pub use scheduler::NotificationScheduler;
