//! Foreground sound/haptic cues.
//!
//! The engine never plays anything itself. The controller hands each cue to
//! a [`CueSink`] together with the user's sound/vibration preferences.

use serde::{Deserialize, Serialize};

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    AlmostDone,
    SegmentComplete,
    SessionComplete,
}

/// Which output channels a cue should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CueOutput {
    pub sound: bool,
    pub vibration: bool,
}

impl CueOutput {
    pub fn is_silent(&self) -> bool {
        !self.sound && !self.vibration
    }
}

/// Host audio/haptic dispatch capability.
pub trait CueSink {
    fn dispatch(&mut self, cue: Cue, output: CueOutput);
}

impl<F: FnMut(Cue, CueOutput)> CueSink for F {
    fn dispatch(&mut self, cue: Cue, output: CueOutput) {
        self(cue, output)
    }
}

/// Cue for an engine transition, if any.
///
/// Manual skips to another segment are silent; reaching the end of the
/// session always sounds.
pub fn cue_for_event(event: &Event) -> Option<Cue> {
    match event {
        Event::SegmentAdvanced { skipped: false, .. } => Some(Cue::SegmentComplete),
        Event::SessionCompleted { .. } => Some(Cue::SessionComplete),
        _ => None,
    }
}
