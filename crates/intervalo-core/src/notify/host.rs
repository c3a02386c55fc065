use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alert::ScheduledAlert;
use crate::error::AlertHostError;

/// Opaque identifier a host hands back for one registered alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(pub String);

/// Host alert-scheduling capability (OS notification center, push relay, ...).
///
/// Registered alerts are expected to outlive the process that registered
/// them.
pub trait AlertHost {
    /// Cancel every alert this application has registered.
    fn cancel_all(&mut self) -> Result<(), AlertHostError>;

    /// Register one alert to fire at `fire_at`.
    fn register_at(
        &mut self,
        fire_at: DateTime<Utc>,
        alert: &ScheduledAlert,
    ) -> Result<AlertId, AlertHostError>;
}

impl<H: AlertHost + ?Sized> AlertHost for Box<H> {
    fn cancel_all(&mut self) -> Result<(), AlertHostError> {
        (**self).cancel_all()
    }

    fn register_at(
        &mut self,
        fire_at: DateTime<Utc>,
        alert: &ScheduledAlert,
    ) -> Result<AlertId, AlertHostError> {
        (**self).register_at(fire_at, alert)
    }
}

/// In-process host that keeps pending alerts in a `Vec`.
///
/// Failure modes can be switched on to exercise degraded behaviour.
#[derive(Debug, Default)]
pub struct MemoryAlertHost {
    pending: Vec<(AlertId, ScheduledAlert)>,
    next_id: u64,
    cancel_calls: usize,
    deny_permission: bool,
    fail_cancel: bool,
    fail_register_after: Option<usize>,
}

impl MemoryAlertHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `PermissionDenied`.
    pub fn denying() -> Self {
        Self {
            deny_permission: true,
            ..Self::default()
        }
    }

    pub fn set_fail_cancel(&mut self, fail: bool) {
        self.fail_cancel = fail;
    }

    /// Accept `count` more registrations, then fail.
    pub fn set_fail_register_after(&mut self, count: Option<usize>) {
        self.fail_register_after = count;
    }

    pub fn pending(&self) -> Vec<&ScheduledAlert> {
        self.pending.iter().map(|(_, a)| a).collect()
    }

    pub fn cancel_calls(&self) -> usize {
        self.cancel_calls
    }
}

impl AlertHost for MemoryAlertHost {
    fn cancel_all(&mut self) -> Result<(), AlertHostError> {
        if self.deny_permission {
            return Err(AlertHostError::PermissionDenied);
        }
        self.cancel_calls += 1;
        if self.fail_cancel {
            return Err(AlertHostError::CancelFailed("host refused cancellation".into()));
        }
        self.pending.clear();
        Ok(())
    }

    fn register_at(
        &mut self,
        fire_at: DateTime<Utc>,
        alert: &ScheduledAlert,
    ) -> Result<AlertId, AlertHostError> {
        if self.deny_permission {
            return Err(AlertHostError::PermissionDenied);
        }
        if let Some(remaining) = self.fail_register_after.as_mut() {
            if *remaining == 0 {
                return Err(AlertHostError::RegisterFailed("host queue full".into()));
            }
            *remaining -= 1;
        }
        self.next_id += 1;
        let id = AlertId(format!("alert-{}", self.next_id));
        let mut stored = alert.clone();
        stored.fire_at = fire_at;
        self.pending.push((id.clone(), stored));
        Ok(id)
    }
}
