//! Replace-all registration of alerts with the host capability.

use chrono::{DateTime, Utc};

use super::alert::{compute_alerts, ScheduledAlert};
use super::host::{AlertHost, AlertId};
use crate::error::{AlertHostError, Result};
use crate::plan::SessionPlan;
use crate::timer::RunState;

/// Owns the boundary with the host alert capability.
///
/// The ids of the currently registered set are held here and swapped out
/// wholesale on every successful replacement; nothing outside the
/// scheduler tracks them.
#[derive(Debug)]
pub struct NotificationScheduler<H> {
    host: H,
    registered: Vec<AlertId>,
    last_error: Option<AlertHostError>,
}

impl<H: AlertHost> NotificationScheduler<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            registered: Vec::new(),
            last_error: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registered_ids(&self) -> &[AlertId] {
        &self.registered
    }

    /// Whether the last interaction with the host failed.
    pub fn is_degraded(&self) -> bool {
        self.last_error.is_some()
    }

    pub fn last_error(&self) -> Option<&AlertHostError> {
        self.last_error.as_ref()
    }

    /// Recompute alerts for `state` and replace the registered set.
    ///
    /// Returns the number of alerts registered.
    pub fn reschedule(
        &mut self,
        plan: &SessionPlan,
        state: &RunState,
        warning_threshold_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let alerts = compute_alerts(
            plan,
            state.current_index,
            state.remaining_secs,
            warning_threshold_secs,
            now,
        );
        self.replace(&alerts)
    }

    /// Cancel the previous set, then register `alerts`.
    ///
    /// Cancellation always completes before the first registration. If it
    /// fails nothing new is registered: the old set may still be live and
    /// registering on top of it would duplicate alerts. A registration
    /// failure stops the loop; the ids registered so far are kept.
    pub fn replace(&mut self, alerts: &[ScheduledAlert]) -> Result<usize> {
        if let Err(err) = self.host.cancel_all() {
            return Err(self.degrade(err).into());
        }
        self.registered.clear();

        let mut ids = Vec::with_capacity(alerts.len());
        for alert in alerts {
            match self.host.register_at(alert.fire_at, alert) {
                Ok(id) => ids.push(id),
                Err(err) => {
                    self.registered = ids;
                    return Err(self.degrade(err).into());
                }
            }
        }

        tracing::debug!(count = ids.len(), "alerts registered");
        self.registered = ids;
        self.last_error = None;
        Ok(self.registered.len())
    }

    /// Cancel every registered alert without registering new ones.
    pub fn clear(&mut self) -> Result<()> {
        if let Err(err) = self.host.cancel_all() {
            return Err(self.degrade(err).into());
        }
        self.registered.clear();
        self.last_error = None;
        Ok(())
    }

    fn degrade(&mut self, err: AlertHostError) -> AlertHostError {
        tracing::warn!(error = %err, "alert host unavailable");
        self.last_error = Some(err.clone());
        err
    }
}
