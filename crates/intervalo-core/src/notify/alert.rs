//! Absolute-time alert computation.
//!
//! Alerts are derived from `(plan, current_index, remaining, threshold, now)`
//! alone, so a full recomputation always yields the same set for the same
//! engine state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::plan::{resolved_duration, SessionPlan};

/// Segments must be strictly longer than this to get a warning.
pub const WARNING_MIN_SEGMENT_SECS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Warning,
    SegmentEnd,
    SegmentStart,
    SessionComplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAlert {
    pub kind: AlertKind,
    pub fire_at: DateTime<Utc>,
    pub segment_index: usize,
    pub label: String,
}

impl ScheduledAlert {
    /// Notification body shown by the host.
    pub fn message(&self) -> String {
        match self.kind {
            AlertKind::Warning => format!("{} is almost done", self.label),
            AlertKind::SegmentEnd => format!("{} finished", self.label),
            AlertKind::SegmentStart => format!("Up next: {}", self.label),
            AlertKind::SessionComplete => "Session complete".to_string(),
        }
    }
}

/// Whether a segment of this length gets an "almost done" warning.
pub fn warns_for(segment_secs: u64, warning_threshold_secs: u64) -> bool {
    warning_threshold_secs > 0 && segment_secs > WARNING_MIN_SEGMENT_SECS
}

/// Compute every future alert for a session currently at `current_index`
/// with `remaining_secs` left in that segment.
///
/// The result is in chronological order and ends with exactly one
/// `SessionComplete`. A segment's `SegmentEnd` and the following
/// `SegmentStart` share the same instant. Warnings that would fire at or
/// before `now`, or at or before their own segment's start, are dropped.
///
/// Boundaries beyond the range `DateTime<Utc>` can represent are never
/// reached, so the schedule stops at the last representable one.
pub fn compute_alerts(
    plan: &SessionPlan,
    current_index: usize,
    remaining_secs: u64,
    warning_threshold_secs: u64,
    now: DateTime<Utc>,
) -> Vec<ScheduledAlert> {
    let mut alerts = Vec::new();
    if current_index >= plan.len() {
        return alerts;
    }

    let mut index = current_index;
    let mut segment_start = now;
    let Some(mut boundary) = after(now, remaining_secs) else {
        return alerts;
    };

    loop {
        let segment = &plan.segments[index];

        if warns_for(resolved_duration(segment), warning_threshold_secs) {
            let warn_at = secs(warning_threshold_secs)
                .and_then(|lead| boundary.checked_sub_signed(lead))
                .filter(|at| *at > now && *at > segment_start);
            if let Some(warn_at) = warn_at {
                alerts.push(ScheduledAlert {
                    kind: AlertKind::Warning,
                    fire_at: warn_at,
                    segment_index: index,
                    label: segment.label.clone(),
                });
            }
        }

        if plan.is_last(index) {
            alerts.push(ScheduledAlert {
                kind: AlertKind::SessionComplete,
                fire_at: boundary,
                segment_index: index,
                label: plan.name.clone(),
            });
            break;
        }

        let next = &plan.segments[index + 1];
        alerts.push(ScheduledAlert {
            kind: AlertKind::SegmentEnd,
            fire_at: boundary,
            segment_index: index,
            label: segment.label.clone(),
        });
        alerts.push(ScheduledAlert {
            kind: AlertKind::SegmentStart,
            fire_at: boundary,
            segment_index: index + 1,
            label: next.label.clone(),
        });

        segment_start = boundary;
        let Some(next_boundary) = after(boundary, resolved_duration(next)) else {
            tracing::debug!(segment_index = index + 1, "segment end out of range; schedule truncated");
            break;
        };
        boundary = next_boundary;
        index += 1;
    }

    alerts
}

fn secs(value: u64) -> Option<Duration> {
    Duration::try_seconds(i64::try_from(value).ok()?)
}

fn after(at: DateTime<Utc>, value: u64) -> Option<DateTime<Utc>> {
    at.checked_add_signed(secs(value)?)
}
