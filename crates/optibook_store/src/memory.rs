//! Process-local appointment store, used when no backend is configured.

use chrono::{DateTime, SecondsFormat, Utc};
use optibook_common::{
    AppointmentRequest, AppointmentStore, BoxFuture, ReservedStart, StoreError, StoredAppointment,
};
use std::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<StoredAppointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.appointments.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> StoreError {
        StoreError::Request("in-memory store lock poisoned".to_string())
    }
}

impl AppointmentStore for InMemoryAppointmentStore {
    fn insert_appointment(
        &self,
        request: AppointmentRequest,
    ) -> BoxFuture<'_, StoredAppointment, StoreError> {
        Box::pin(async move {
            let appointment =
                StoredAppointment::from_request(uuid::Uuid::new_v4().to_string(), request);
            self.appointments
                .write()
                .map_err(|_| Self::poisoned())?
                .push(appointment.clone());
            debug!("Stored appointment {} in memory", appointment.id);
            Ok(appointment)
        })
    }

    fn reserved_starts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<ReservedStart>, StoreError> {
        Box::pin(async move {
            let appointments = self.appointments.read().map_err(|_| Self::poisoned())?;
            let mut starts: Vec<DateTime<Utc>> = appointments
                .iter()
                .map(|a| a.starts_at)
                .filter(|s| *s >= start && *s < end)
                .collect();
            starts.sort();
            Ok(starts
                .into_iter()
                .map(|s| ReservedStart {
                    starts_at: s.to_rfc3339_opts(SecondsFormat::Secs, true),
                })
                .collect())
        })
    }
}
