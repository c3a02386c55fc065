use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Countdown;

/// Every engine transition produces an Event.
/// The cue dispatcher and the alert scheduler react to them; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        plan_name: String,
        segment_count: usize,
        total_secs: u64,
        pre_countdown_secs: u32,
        at: DateTime<Utc>,
    },
    /// The pre-countdown moved to its next display value.
    CountdownTicked {
        countdown: Countdown,
        at: DateTime<Utc>,
    },
    /// The "Go" tick elapsed and the first segment is now running.
    SessionRunning {
        segment_index: usize,
        label: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Moved forward to the next segment, either because the current one
    /// ran out (`skipped == false`) or through a manual skip.
    SegmentAdvanced {
        from_index: usize,
        to_index: usize,
        label: String,
        duration_secs: u64,
        skipped: bool,
        at: DateTime<Utc>,
    },
    SegmentRewound {
        from_index: usize,
        to_index: usize,
        label: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        plan_name: String,
        elapsed_secs: u64,
        skipped: bool,
        at: DateTime<Utc>,
    },
    SessionStopped {
        segment_index: usize,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::SessionPaused {
            remaining_secs: 12,
            at: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "session_paused");
        assert_eq!(json["remaining_secs"], 12);
    }
}
