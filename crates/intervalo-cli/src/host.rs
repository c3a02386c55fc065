//! Terminal stand-ins for the host alert and cue capabilities.

use chrono::{DateTime, Utc};
use intervalo_core::{AlertHost, AlertHostError, AlertId, Cue, CueOutput, CueSink, ScheduledAlert};

/// Logs alert registrations instead of handing them to an OS notification
/// center.
#[derive(Debug, Default)]
pub struct LogAlertHost {
    next_id: u64,
    live: usize,
}

impl AlertHost for LogAlertHost {
    fn cancel_all(&mut self) -> Result<(), AlertHostError> {
        if self.live > 0 {
            tracing::debug!(count = self.live, "cancelled alerts");
        }
        self.live = 0;
        Ok(())
    }

    fn register_at(
        &mut self,
        fire_at: DateTime<Utc>,
        alert: &ScheduledAlert,
    ) -> Result<AlertId, AlertHostError> {
        self.next_id += 1;
        self.live += 1;
        tracing::debug!(
            id = self.next_id,
            kind = ?alert.kind,
            fire_at = %fire_at.to_rfc3339(),
            "{}",
            alert.message()
        );
        Ok(AlertId(format!("log-{}", self.next_id)))
    }
}

/// Rings the terminal bell for sound cues.
#[derive(Debug, Default)]
pub struct TerminalCues;

impl CueSink for TerminalCues {
    fn dispatch(&mut self, cue: Cue, output: CueOutput) {
        if output.sound {
            eprint!("\x07");
        }
        tracing::info!(?cue, vibration = output.vibration, "cue");
    }
}
