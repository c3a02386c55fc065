//! Session controller.
//!
//! Wraps one [`TimerEngine`] with its alert scheduler and cue sink so every
//! engine mutation is followed by the matching side effects:
//!
//! - `Running` after a phase/index/remaining change: recompute and replace
//!   all background alerts.
//! - Any other phase after a change: cancel all background alerts.
//! - Plain countdown ticks leave the registered alerts alone.
//!
//! Alert failures are logged and latched in a degraded flag; they never
//! fail or interrupt the session itself.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::cues::{cue_for_event, Cue, CueSink};
use crate::error::Result;
use crate::events::Event;
use crate::notify::{warns_for, AlertHost, NotificationScheduler};
use crate::plan::SessionPlan;
use crate::timer::{Phase, RunState, TimerEngine};

pub struct SessionController<H, C, K = SystemClock> {
    engine: TimerEngine,
    scheduler: NotificationScheduler<H>,
    cues: C,
    clock: K,
    settings: Settings,
}

impl<H: AlertHost, C: CueSink> SessionController<H, C, SystemClock> {
    pub fn new(host: H, cues: C, settings: Settings) -> Self {
        Self::with_clock(host, cues, SystemClock, settings)
    }
}

impl<H: AlertHost, C: CueSink, K: Clock> SessionController<H, C, K> {
    pub fn with_clock(host: H, cues: C, clock: K, settings: Settings) -> Self {
        Self {
            engine: TimerEngine::new(),
            scheduler: NotificationScheduler::new(host),
            cues,
            clock,
            settings,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> RunState {
        self.engine.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn scheduler(&self) -> &NotificationScheduler<H> {
        &self.scheduler
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// True while background alerts are known to be missing.
    pub fn alerts_degraded(&self) -> bool {
        self.scheduler.is_degraded()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start `plan` with the configured pre-countdown.
    pub fn start(&mut self, plan: Arc<SessionPlan>) -> Result<Event> {
        let event = self
            .engine
            .start(plan, self.settings.pre_countdown_secs)?;
        tracing::info!(phase = ?self.engine.phase(), "session started");
        self.sync_alerts();
        Ok(event)
    }

    /// Drive the engine by one second.
    ///
    /// Routes to the pre-countdown tick or the session tick depending on
    /// the phase; does nothing in `Idle`, `Paused` and `Complete`.
    pub fn tick(&mut self) -> Option<Event> {
        match self.engine.phase() {
            Phase::PreCountdown => {
                let event = self.engine.tick_pre_countdown()?;
                if self.engine.phase() == Phase::Running {
                    self.sync_alerts();
                }
                Some(event)
            }
            Phase::Running => match self.engine.tick() {
                Some(event) => {
                    if let Some(cue) = cue_for_event(&event) {
                        self.cue(cue);
                    }
                    if matches!(event, Event::SessionCompleted { .. }) {
                        tracing::info!("session complete");
                    }
                    self.sync_alerts();
                    Some(event)
                }
                None => {
                    self.check_almost_done();
                    None
                }
            },
            _ => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = self.engine.pause()?;
        self.sync_alerts();
        Some(event)
    }

    pub fn resume(&mut self) -> Option<Event> {
        let event = self.engine.resume()?;
        self.sync_alerts();
        Some(event)
    }

    /// See [`TimerEngine::skip_forward`].
    pub fn skip_forward(&mut self) -> Option<Event> {
        let event = self.engine.skip_forward()?;
        if let Some(cue) = cue_for_event(&event) {
            self.cue(cue);
        }
        self.sync_alerts();
        Some(event)
    }

    /// See [`TimerEngine::skip_backward`].
    pub fn skip_backward(&mut self) -> Option<Event> {
        let event = self.engine.skip_backward()?;
        self.sync_alerts();
        Some(event)
    }

    pub fn stop(&mut self) -> Option<Event> {
        let event = self.engine.stop();
        // Cancel even if there was no run: stale alerts from a previous
        // process may still be registered with the host.
        self.sync_alerts();
        event
    }

    /// Swap in new settings; a running session is rescheduled against the
    /// new warning threshold.
    pub fn update_settings(&mut self, settings: Settings) {
        let changed = settings.warning_secs_before_end != self.settings.warning_secs_before_end;
        self.settings = settings;
        if changed && self.engine.phase() == Phase::Running {
            self.sync_alerts();
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn sync_alerts(&mut self) {
        let state = self.engine.snapshot();
        let result = match (state.phase, self.engine.plan()) {
            (Phase::Running, Some(plan)) => self
                .scheduler
                .reschedule(
                    plan,
                    &state,
                    self.settings.warning_secs_before_end,
                    self.clock.now(),
                )
                .map(|_| ()),
            _ => self.scheduler.clear(),
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "background alerts degraded; session continues");
        }
    }

    fn check_almost_done(&mut self) {
        let state = self.engine.snapshot();
        let threshold = self.settings.warning_secs_before_end;
        if state.remaining_secs == threshold
            && warns_for(self.engine.segment_total_secs(), threshold)
        {
            self.cue(Cue::AlmostDone);
        }
    }

    fn cue(&mut self, cue: Cue) {
        let output = self.settings.cue_output();
        if output.is_silent() {
            return;
        }
        tracing::debug!(?cue, ?output, "dispatching cue");
        self.cues.dispatch(cue, output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::cues::CueOutput;
    use crate::notify::{AlertKind, MemoryAlertHost};
    use crate::plan::{Segment, SegmentKind};
    use chrono::{DateTime, Utc};

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn plan() -> Arc<SessionPlan> {
        Arc::new(
            SessionPlan::new(
                "Intervals",
                vec![
                    Segment::timed("Run", SegmentKind::Activity, 30),
                    Segment::timed("Walk", SegmentKind::Rest, 10),
                ],
            )
            .unwrap(),
        )
    }

    fn settings(pre: u32) -> Settings {
        Settings {
            pre_countdown_secs: pre,
            ..Settings::default()
        }
    }

    #[test]
    fn start_schedules_when_running_immediately() {
        let clock = ManualClock::new(t0());
        let mut cues = Vec::new();
        let mut ctl = SessionController::with_clock(
            MemoryAlertHost::new(),
            |cue: Cue, _: CueOutput| cues.push(cue),
            &clock,
            settings(0),
        );
        ctl.start(plan()).unwrap();
        let pending = ctl.scheduler().host().pending();
        assert_eq!(pending.len(), 4);
        assert_eq!(pending[0].kind, AlertKind::Warning);
        assert_eq!((pending[0].fire_at - t0()).num_seconds(), 20);
    }

    #[test]
    fn pre_countdown_defers_scheduling_until_running() {
        let clock = ManualClock::new(t0());
        let mut ctl = SessionController::with_clock(
            MemoryAlertHost::new(),
            |_: Cue, _: CueOutput| {},
            &clock,
            settings(2),
        );
        ctl.start(plan()).unwrap();
        assert!(ctl.scheduler().host().pending().is_empty());

        for _ in 0..3 {
            clock.advance(1);
            ctl.tick();
        }
        assert_eq!(ctl.phase(), Phase::Running);
        let pending = ctl.scheduler().host().pending();
        assert_eq!(
            (pending.last().unwrap().fire_at - t0()).num_seconds(),
            3 + 40
        );
    }

    #[test]
    fn pause_cancels_and_resume_reschedules_from_now() {
        let clock = ManualClock::new(t0());
        let mut ctl = SessionController::with_clock(
            MemoryAlertHost::new(),
            |_: Cue, _: CueOutput| {},
            &clock,
            settings(0),
        );
        ctl.start(plan()).unwrap();
        for _ in 0..5 {
            clock.advance(1);
            ctl.tick();
        }
        ctl.pause();
        assert!(ctl.scheduler().host().pending().is_empty());

        clock.advance(60);
        ctl.resume();
        let pending = ctl.scheduler().host().pending();
        let complete = pending.last().unwrap();
        assert_eq!(complete.kind, AlertKind::SessionComplete);
        assert_eq!((complete.fire_at - t0()).num_seconds(), 65 + 25 + 10);
    }

    #[test]
    fn cues_follow_ticks_and_respect_settings() {
        let clock = ManualClock::new(t0());
        let mut cues = Vec::new();
        {
            let mut ctl = SessionController::with_clock(
                MemoryAlertHost::new(),
                |cue: Cue, _: CueOutput| cues.push(cue),
                &clock,
                settings(0),
            );
            ctl.start(plan()).unwrap();
            for _ in 0..40 {
                ctl.tick();
            }
            assert_eq!(ctl.phase(), Phase::Complete);
        }
        assert_eq!(
            cues,
            vec![Cue::AlmostDone, Cue::SegmentComplete, Cue::SessionComplete]
        );

        let mut muted = Vec::new();
        {
            let quiet = Settings {
                enable_sounds: false,
                enable_vibration: false,
                ..settings(0)
            };
            let mut ctl = SessionController::with_clock(
                MemoryAlertHost::new(),
                |cue: Cue, _: CueOutput| muted.push(cue),
                &clock,
                quiet,
            );
            ctl.start(plan()).unwrap();
            for _ in 0..40 {
                ctl.tick();
            }
        }
        assert!(muted.is_empty());
    }

    #[test]
    fn denied_alerts_do_not_block_the_session() {
        let clock = ManualClock::new(t0());
        let mut ctl = SessionController::with_clock(
            MemoryAlertHost::denying(),
            |_: Cue, _: CueOutput| {},
            &clock,
            settings(0),
        );
        ctl.start(plan()).unwrap();
        assert!(ctl.alerts_degraded());
        for _ in 0..40 {
            ctl.tick();
        }
        assert_eq!(ctl.phase(), Phase::Complete);
        assert_eq!(ctl.snapshot().elapsed_secs, 40);
    }

    #[test]
    fn plain_ticks_do_not_touch_the_host() {
        let clock = ManualClock::new(t0());
        let mut ctl = SessionController::with_clock(
            MemoryAlertHost::new(),
            |_: Cue, _: CueOutput| {},
            &clock,
            settings(0),
        );
        ctl.start(plan()).unwrap();
        let cancels = ctl.scheduler().host().cancel_calls();
        for _ in 0..29 {
            ctl.tick();
        }
        assert_eq!(ctl.scheduler().host().cancel_calls(), cancels);
        ctl.tick();
        assert_eq!(ctl.scheduler().host().cancel_calls(), cancels + 1);
    }

    #[test]
    fn skip_backward_reschedules_previous_segment_from_now() {
        let clock = ManualClock::new(t0());
        let mut ctl = SessionController::with_clock(
            MemoryAlertHost::new(),
            |_: Cue, _: CueOutput| {},
            &clock,
            settings(0),
        );
        ctl.start(plan()).unwrap();
        ctl.skip_forward();
        clock.advance(7);
        let cancels = ctl.scheduler().host().cancel_calls();

        assert!(ctl.skip_backward().is_some());
        assert_eq!(ctl.snapshot().current_index, 0);
        assert_eq!(ctl.snapshot().remaining_secs, 30);
        assert_eq!(ctl.scheduler().host().cancel_calls(), cancels + 1);

        let offsets: Vec<_> = ctl
            .scheduler()
            .host()
            .pending()
            .iter()
            .map(|a| (a.kind, (a.fire_at - t0()).num_seconds()))
            .collect();
        assert_eq!(
            offsets,
            vec![
                (AlertKind::Warning, 7 + 20),
                (AlertKind::SegmentEnd, 7 + 30),
                (AlertKind::SegmentStart, 7 + 30),
                (AlertKind::SessionComplete, 7 + 40),
            ]
        );
    }

    #[test]
    fn skip_forward_while_paused_keeps_alerts_cleared() {
        let clock = ManualClock::new(t0());
        let mut ctl = SessionController::with_clock(
            MemoryAlertHost::new(),
            |_: Cue, _: CueOutput| {},
            &clock,
            settings(0),
        );
        ctl.start(plan()).unwrap();
        for _ in 0..5 {
            clock.advance(1);
            ctl.tick();
        }
        ctl.pause();
        let cancels = ctl.scheduler().host().cancel_calls();

        assert!(ctl.skip_forward().is_some());
        assert_eq!(ctl.phase(), Phase::Paused);
        assert_eq!(ctl.snapshot().current_index, 1);
        assert_eq!(ctl.scheduler().host().cancel_calls(), cancels + 1);
        assert!(ctl.scheduler().host().pending().is_empty());
        assert!(ctl.scheduler().registered_ids().is_empty());

        clock.advance(30);
        ctl.resume();
        let pending = ctl.scheduler().host().pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, AlertKind::SessionComplete);
        assert_eq!((pending[0].fire_at - t0()).num_seconds(), 35 + 10);
    }

    #[test]
    fn stop_clears_alerts() {
        let clock = ManualClock::new(t0());
        let mut ctl = SessionController::with_clock(
            MemoryAlertHost::new(),
            |_: Cue, _: CueOutput| {},
            &clock,
            settings(0),
        );
        ctl.start(plan()).unwrap();
        assert!(ctl.stop().is_some());
        assert_eq!(ctl.phase(), Phase::Idle);
        assert!(ctl.scheduler().host().pending().is_empty());
    }

    #[test]
    fn changing_threshold_reschedules_running_session() {
        let clock = ManualClock::new(t0());
        let mut ctl = SessionController::with_clock(
            MemoryAlertHost::new(),
            |_: Cue, _: CueOutput| {},
            &clock,
            settings(0),
        );
        ctl.start(plan()).unwrap();
        ctl.update_settings(Settings {
            warning_secs_before_end: 5,
            ..settings(0)
        });
        let warning = ctl.scheduler().host().pending()[0].clone();
        assert_eq!(warning.kind, AlertKind::Warning);
        assert_eq!((warning.fire_at - t0()).num_seconds(), 25);
    }
}
