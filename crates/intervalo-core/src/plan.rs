//! Session plans and segment duration resolution.
//!
//! A [`SessionPlan`] is produced by an external authoring layer and is
//! immutable for the lifetime of one run. Durations are always resolved
//! through [`resolved_duration`] so the engine and the alert scheduler agree
//! on every segment boundary.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Activity,
    Rest,
    Transition,
}

/// How a segment's length is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TimingMode {
    Duration {
        duration_seconds: u64,
    },
    /// `reps × seconds_per_rep`, rounded once to whole seconds.
    Reps {
        reps: u32,
        seconds_per_rep: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub label: String,
    pub kind: SegmentKind,
    #[serde(flatten)]
    pub mode: TimingMode,
}

impl Segment {
    pub fn timed(label: impl Into<String>, kind: SegmentKind, duration_seconds: u64) -> Self {
        Self {
            label: label.into(),
            kind,
            mode: TimingMode::Duration { duration_seconds },
        }
    }

    pub fn reps(
        label: impl Into<String>,
        kind: SegmentKind,
        reps: u32,
        seconds_per_rep: f64,
    ) -> Self {
        Self {
            label: label.into(),
            kind,
            mode: TimingMode::Reps {
                reps,
                seconds_per_rep,
            },
        }
    }

    /// Shorthand for [`resolved_duration`].
    pub fn duration_secs(&self) -> u64 {
        resolved_duration(self)
    }
}

/// Concrete length of a segment in whole seconds.
///
/// `Reps` mode rounds `reps × seconds_per_rep` to the nearest second.
/// Callers evaluate this once when a segment is entered and never
/// re-derive remaining time from it mid-segment.
pub fn resolved_duration(segment: &Segment) -> u64 {
    match segment.mode {
        TimingMode::Duration { duration_seconds } => duration_seconds,
        TimingMode::Reps {
            reps,
            seconds_per_rep,
        } => {
            let total = (f64::from(reps) * seconds_per_rep).round();
            // Negative or NaN products saturate to 0.
            total as u64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub name: String,
    pub segments: Vec<Segment>,
}

impl SessionPlan {
    /// Build a plan, rejecting an empty segment list.
    pub fn new(name: impl Into<String>, segments: Vec<Segment>) -> Result<Self> {
        let name = name.into();
        if segments.is_empty() {
            return Err(CoreError::InvalidPlan(format!(
                "plan '{name}' has no segments"
            )));
        }
        Ok(Self { name, segments })
    }

    /// Parse a plan from JSON as handed over by the authoring layer.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.segments.len()
    }

    /// Saturates at `u64::MAX`.
    pub fn total_duration_secs(&self) -> u64 {
        self.segments
            .iter()
            .map(resolved_duration)
            .fold(0, u64::saturating_add)
    }

    /// Seconds contained in the segments before `index`.
    pub fn cumulative_secs(&self, index: usize) -> u64 {
        self.segments
            .iter()
            .take(index)
            .map(resolved_duration)
            .fold(0, u64::saturating_add)
    }
}
