//! Session timer engine.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads or timers - the caller invokes `tick_pre_countdown()` once per
//! second while in `PreCountdown` and `tick()` once per second while
//! `Running`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> PreCountdown -> Running <-> Paused -> Complete
//! ```
//!
//! `stop()` returns to `Idle` from anywhere. Only `start()` can fail; every
//! other command is ignored (returns `None`) when invalid for the phase.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.start(plan, 3)?;
//! // Once per second:
//! engine.tick_pre_countdown(); // while PreCountdown
//! engine.tick();               // while Running
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::plan::{resolved_duration, Segment, SessionPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    PreCountdown,
    Running,
    Paused,
    Complete,
}

/// Display value of the pre-countdown: `3, 2, 1`, then one `Go` tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Countdown {
    Count(u32),
    Go,
}

/// Read-only snapshot of the engine, pushed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub phase: Phase,
    pub current_index: usize,
    pub remaining_secs: u64,
    pub elapsed_secs: u64,
    pub pre_countdown: Option<Countdown>,
}

impl RunState {
    const IDLE: RunState = RunState {
        phase: Phase::Idle,
        current_index: 0,
        remaining_secs: 0,
        elapsed_secs: 0,
        pre_countdown: None,
    };
}

#[derive(Debug, Clone)]
struct ActiveRun {
    plan: Arc<SessionPlan>,
    current_index: usize,
    /// Resolved once on segment entry; ticks only ever decrement it.
    remaining_secs: u64,
    elapsed_secs: u64,
    pre_countdown: Option<Countdown>,
}

impl ActiveRun {
    fn segment(&self) -> &Segment {
        &self.plan.segments[self.current_index]
    }

    fn enter(&mut self, index: usize) {
        self.current_index = index;
        self.remaining_secs = resolved_duration(&self.plan.segments[index]);
    }

    fn has_next(&self) -> bool {
        self.current_index + 1 < self.plan.len()
    }

    fn advance(&mut self, skipped: bool) -> Event {
        let from = self.current_index;
        self.enter(from + 1);
        tracing::debug!(from, to = self.current_index, skipped, "segment advanced");
        Event::SegmentAdvanced {
            from_index: from,
            to_index: self.current_index,
            label: self.segment().label.clone(),
            duration_secs: self.remaining_secs,
            skipped,
            at: Utc::now(),
        }
    }

    fn finish(&mut self, skipped: bool) -> Event {
        self.remaining_secs = 0;
        tracing::debug!(elapsed = self.elapsed_secs, skipped, "session complete");
        Event::SessionCompleted {
            plan_name: self.plan.name.clone(),
            elapsed_secs: self.elapsed_secs,
            skipped,
            at: Utc::now(),
        }
    }
}

/// Core session engine.
///
/// Owns the run state for one session at a time. The plan is shared
/// through an `Arc` and never mutated.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    phase: Phase,
    run: Option<ActiveRun>,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            run: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snapshot(&self) -> RunState {
        match &self.run {
            Some(run) => RunState {
                phase: self.phase,
                current_index: run.current_index,
                remaining_secs: run.remaining_secs,
                elapsed_secs: run.elapsed_secs,
                pre_countdown: run.pre_countdown,
            },
            None => RunState::IDLE,
        }
    }

    pub fn plan(&self) -> Option<&Arc<SessionPlan>> {
        self.run.as_ref().map(|r| &r.plan)
    }

    pub fn current_segment(&self) -> Option<&Segment> {
        self.run.as_ref().map(ActiveRun::segment)
    }

    /// Full resolved length of the current segment.
    pub fn segment_total_secs(&self) -> u64 {
        self.current_segment().map(resolved_duration).unwrap_or(0)
    }

    /// 0.0 .. 1.0 progress within current segment.
    pub fn segment_progress(&self) -> f64 {
        let total = self.segment_total_secs();
        if total == 0 {
            return 0.0;
        }
        let remaining = self.run.as_ref().map_or(0, |r| r.remaining_secs);
        1.0 - (remaining as f64 / total as f64)
    }

    /// 0.0 .. 100.0 progress across the whole plan.
    pub fn session_progress_pct(&self) -> f64 {
        let Some(run) = &self.run else {
            return 0.0;
        };
        if self.phase == Phase::Complete {
            return 100.0;
        }
        let total = run.plan.total_duration_secs() as f64;
        if total == 0.0 {
            return 0.0;
        }
        let done = run.plan.cumulative_secs(run.current_index) as f64
            + (self.segment_total_secs() - run.remaining_secs.min(self.segment_total_secs()))
                as f64;
        (done / total * 100.0).min(100.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new run of `plan`.
    ///
    /// Fails with `InvalidPlan` when the plan has no segments; the engine
    /// is left exactly as it was. Any previous run is replaced.
    pub fn start(&mut self, plan: Arc<SessionPlan>, pre_countdown_secs: u32) -> Result<Event> {
        if plan.is_empty() {
            return Err(CoreError::InvalidPlan(format!(
                "plan '{}' has no segments",
                plan.name
            )));
        }

        let mut run = ActiveRun {
            plan,
            current_index: 0,
            remaining_secs: 0,
            elapsed_secs: 0,
            pre_countdown: None,
        };
        run.enter(0);

        if pre_countdown_secs > 0 {
            run.pre_countdown = Some(Countdown::Count(pre_countdown_secs));
            self.phase = Phase::PreCountdown;
        } else {
            self.phase = Phase::Running;
        }

        let event = Event::SessionStarted {
            plan_name: run.plan.name.clone(),
            segment_count: run.plan.len(),
            total_secs: run.plan.total_duration_secs(),
            pre_countdown_secs,
            at: Utc::now(),
        };
        tracing::debug!(
            plan = %run.plan.name,
            segments = run.plan.len(),
            pre_countdown_secs,
            "session started"
        );
        self.run = Some(run);
        Ok(event)
    }

    /// Advance the pre-countdown by one second.
    ///
    /// `Count(n)` steps down to `Count(1)`, then shows `Go` for exactly one
    /// tick, then the session enters `Running`.
    pub fn tick_pre_countdown(&mut self) -> Option<Event> {
        if self.phase != Phase::PreCountdown {
            return None;
        }
        let run = self.run.as_mut()?;
        match run.pre_countdown? {
            Countdown::Count(n) => {
                let next = if n > 1 {
                    Countdown::Count(n - 1)
                } else {
                    Countdown::Go
                };
                run.pre_countdown = Some(next);
                Some(Event::CountdownTicked {
                    countdown: next,
                    at: Utc::now(),
                })
            }
            Countdown::Go => {
                run.pre_countdown = None;
                self.phase = Phase::Running;
                let seg = run.segment();
                Some(Event::SessionRunning {
                    segment_index: run.current_index,
                    label: seg.label.clone(),
                    duration_secs: run.remaining_secs,
                    at: Utc::now(),
                })
            }
        }
    }

    /// Call once per second while running.
    ///
    /// Returns `SegmentAdvanced` when the current segment ran out and a
    /// next one was entered, `SessionCompleted` when the last one ran out,
    /// and `None` for a plain countdown tick.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != Phase::Running {
            return None;
        }
        let run = self.run.as_mut()?;
        if run.remaining_secs > 0 {
            run.remaining_secs -= 1;
            run.elapsed_secs += 1;
        }
        if run.remaining_secs > 0 {
            return None;
        }
        if run.has_next() {
            Some(run.advance(false))
        } else {
            self.phase = Phase::Complete;
            Some(run.finish(false))
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.phase {
            Phase::Running => {
                self.phase = Phase::Paused;
                Some(Event::SessionPaused {
                    remaining_secs: self.run.as_ref()?.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn resume(&mut self) -> Option<Event> {
        match self.phase {
            Phase::Paused => {
                self.phase = Phase::Running;
                Some(Event::SessionResumed {
                    remaining_secs: self.run.as_ref()?.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Jump to the next segment with its full duration.
    ///
    /// On the last segment the session completes instead and
    /// `SessionCompleted { skipped: true }` is returned; callers treat that
    /// as "no next segment", not as an error. Ignored outside
    /// `Running`/`Paused`.
    pub fn skip_forward(&mut self) -> Option<Event> {
        if !matches!(self.phase, Phase::Running | Phase::Paused) {
            return None;
        }
        let run = self.run.as_mut()?;
        if run.has_next() {
            Some(run.advance(true))
        } else {
            self.phase = Phase::Complete;
            Some(run.finish(true))
        }
    }

    /// Jump back to the previous segment with its full duration.
    ///
    /// Returns `None` and leaves the state untouched at index 0 or outside
    /// `Running`/`Paused`.
    pub fn skip_backward(&mut self) -> Option<Event> {
        if !matches!(self.phase, Phase::Running | Phase::Paused) {
            return None;
        }
        let run = self.run.as_mut()?;
        if run.current_index == 0 {
            return None;
        }
        let from = run.current_index;
        run.enter(from - 1);
        let seg = run.segment();
        tracing::debug!(from, to = run.current_index, "segment rewound");
        Some(Event::SegmentRewound {
            from_index: from,
            to_index: run.current_index,
            label: seg.label.clone(),
            duration_secs: run.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Tear down the run from any phase.
    pub fn stop(&mut self) -> Option<Event> {
        self.phase = Phase::Idle;
        let run = self.run.take()?;
        tracing::debug!(index = run.current_index, "session stopped");
        Some(Event::SessionStopped {
            segment_index: run.current_index,
            elapsed_secs: run.elapsed_secs,
            at: Utc::now(),
        })
    }
}
