//! Property tests for the engine and the alert schedule.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use intervalo_core::{
    compute_alerts, resolved_duration, AlertKind, Phase, Segment, SegmentKind, SessionPlan,
    TimerEngine,
};
use proptest::prelude::*;

fn now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
}

fn segment() -> impl Strategy<Value = Segment> {
    prop_oneof![
        (1u64..=90).prop_map(|d| Segment::timed("timed", SegmentKind::Activity, d)),
        (1u32..=20, 1u32..=12)
            .prop_map(|(reps, halves)| Segment::reps(
                "reps",
                SegmentKind::Activity,
                reps,
                f64::from(halves) * 0.5
            )),
        (1u64..=20).prop_map(|d| Segment::timed("rest", SegmentKind::Rest, d)),
    ]
}

fn plan() -> impl Strategy<Value = Arc<SessionPlan>> {
    prop::collection::vec(segment(), 1..8)
        .prop_map(|segments| Arc::new(SessionPlan::new("Generated", segments).unwrap()))
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Tick,
    TickPre,
    Pause,
    Resume,
    SkipForward,
    SkipBackward,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => Just(Op::Tick),
        1 => Just(Op::TickPre),
        1 => Just(Op::Pause),
        1 => Just(Op::Resume),
        1 => Just(Op::SkipForward),
        1 => Just(Op::SkipBackward),
    ]
}

fn apply(engine: &mut TimerEngine, op: Op) {
    match op {
        Op::Tick => {
            engine.tick();
        }
        Op::TickPre => {
            engine.tick_pre_countdown();
        }
        Op::Pause => {
            engine.pause();
        }
        Op::Resume => {
            engine.resume();
        }
        Op::SkipForward => {
            engine.skip_forward();
        }
        Op::SkipBackward => {
            engine.skip_backward();
        }
    }
}

fn kind_rank(kind: AlertKind) -> u8 {
    match kind {
        AlertKind::Warning => 0,
        AlertKind::SegmentEnd => 1,
        AlertKind::SegmentStart => 2,
        AlertKind::SessionComplete => 3,
    }
}

proptest! {
    #[test]
    fn ticking_to_completion_takes_total_duration(plan in plan()) {
        let total: u64 = plan.segments.iter().map(resolved_duration).sum();
        prop_assert_eq!(plan.total_duration_secs(), total);

        let mut engine = TimerEngine::new();
        engine.start(plan.clone(), 0).unwrap();
        let mut ticks = 0u64;
        while engine.phase() == Phase::Running {
            engine.tick();
            ticks += 1;
            prop_assert!(ticks <= total);
        }
        prop_assert_eq!(engine.phase(), Phase::Complete);
        prop_assert_eq!(ticks, total);
        prop_assert_eq!(engine.snapshot().elapsed_secs, total);
    }

    #[test]
    fn invariants_hold_for_any_mutation_sequence(
        plan in plan(),
        pre in 0u32..4,
        ops in prop::collection::vec(op(), 0..200),
    ) {
        let mut engine = TimerEngine::new();
        engine.start(plan.clone(), pre).unwrap();
        let mut last_elapsed = 0;

        for op in ops {
            apply(&mut engine, op);
            let s = engine.snapshot();
            prop_assert!(s.current_index < plan.len());
            prop_assert!(s.remaining_secs <= resolved_duration(&plan.segments[s.current_index]));
            prop_assert!(s.elapsed_secs >= last_elapsed);
            last_elapsed = s.elapsed_secs;

            if s.phase == Phase::Running {
                let alerts = compute_alerts(&plan, s.current_index, s.remaining_secs, 10, now());
                let completes: Vec<_> = alerts
                    .iter()
                    .filter(|a| a.kind == AlertKind::SessionComplete)
                    .collect();
                prop_assert_eq!(completes.len(), 1);
                prop_assert_eq!(alerts.last().map(|a| a.kind), Some(AlertKind::SessionComplete));

                for pair in alerts.windows(2) {
                    let a = (pair[0].fire_at, kind_rank(pair[0].kind));
                    let b = (pair[1].fire_at, kind_rank(pair[1].kind));
                    prop_assert!(a < b, "alerts out of order: {:?} then {:?}", pair[0], pair[1]);
                }
                for alert in &alerts {
                    prop_assert!(alert.fire_at > now());
                }
            }
        }
    }

    #[test]
    fn no_warning_for_short_segments(
        plan in plan(),
        threshold in 1u64..30,
    ) {
        let first = resolved_duration(&plan.segments[0]);
        let alerts = compute_alerts(&plan, 0, first, threshold, now());
        for alert in alerts.iter().filter(|a| a.kind == AlertKind::Warning) {
            prop_assert!(resolved_duration(&plan.segments[alert.segment_index]) > 15);
        }
    }

    #[test]
    fn boundaries_match_cumulative_durations(plan in plan()) {
        let first = resolved_duration(&plan.segments[0]);
        let alerts = compute_alerts(&plan, 0, first, 10, now());
        for alert in alerts.iter().filter(|a| a.kind == AlertKind::SegmentStart) {
            let expected = now() + Duration::seconds(plan.cumulative_secs(alert.segment_index) as i64);
            prop_assert_eq!(alert.fire_at, expected);
        }
        let complete = alerts.last().unwrap();
        prop_assert_eq!(
            complete.fire_at,
            now() + Duration::seconds(plan.total_duration_secs() as i64)
        );
    }

    #[test]
    fn double_pause_and_resume_are_idempotent(plan in plan(), ticks in 0usize..10) {
        let mut engine = TimerEngine::new();
        engine.start(plan, 0).unwrap();
        for _ in 0..ticks {
            engine.tick();
        }

        let mut once = engine.clone();
        once.pause();
        let mut twice = engine.clone();
        twice.pause();
        twice.pause();
        prop_assert_eq!(once.snapshot(), twice.snapshot());

        once.resume();
        twice.resume();
        twice.resume();
        prop_assert_eq!(once.snapshot(), twice.snapshot());
    }
}
