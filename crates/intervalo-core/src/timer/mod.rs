mod engine;

pub use engine::{Countdown, Phase, RunState, TimerEngine};
