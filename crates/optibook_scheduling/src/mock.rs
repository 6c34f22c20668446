// --- File: crates/optibook_scheduling/src/mock.rs ---
//! Recording fakes of the store and notification services.

use chrono::{DateTime, Utc};
use optibook_common::{
    AppointmentRequest, AppointmentStore, BookingEmailData, BoxFuture, NotificationResult,
    NotificationService, NotifyError, ReservedStart, StoreError, StoredAppointment,
};
use std::sync::Mutex;

/// Store fake: returns canned reservations, records inserts, optionally fails.
#[derive(Default)]
pub struct MockStore {
    pub reserved: Vec<ReservedStart>,
    pub read_error: Option<StoreError>,
    pub insert_error: Option<StoreError>,
    pub inserts: Mutex<Vec<AppointmentRequest>>,
    pub queries: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl MockStore {
    pub fn with_reserved(starts: &[&str]) -> Self {
        Self {
            reserved: starts
                .iter()
                .map(|s| ReservedStart {
                    starts_at: s.to_string(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            read_error: Some(StoreError::Request("connection reset".to_string())),
            ..Self::default()
        }
    }

    pub fn failing_inserts(error: StoreError) -> Self {
        Self {
            insert_error: Some(error),
            ..Self::default()
        }
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.lock().unwrap().len()
    }
}

impl AppointmentStore for MockStore {
    fn insert_appointment(
        &self,
        request: AppointmentRequest,
    ) -> BoxFuture<'_, StoredAppointment, StoreError> {
        Box::pin(async move {
            let mut inserts = self.inserts.lock().unwrap();
            inserts.push(request.clone());
            if let Some(err) = &self.insert_error {
                return Err(err.clone());
            }
            Ok(StoredAppointment::from_request(
                format!("apt-{}", inserts.len()),
                request,
            ))
        })
    }

    fn reserved_starts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<ReservedStart>, StoreError> {
        Box::pin(async move {
            self.queries.lock().unwrap().push((start, end));
            match &self.read_error {
                Some(err) => Err(err.clone()),
                None => Ok(self.reserved.clone()),
            }
        })
    }
}

/// Notifier fake: records every payload, optionally fails.
#[derive(Default)]
pub struct MockNotifier {
    pub fail: bool,
    pub sent: Mutex<Vec<BookingEmailData>>,
}

impl MockNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl NotificationService for MockNotifier {
    fn send_booking_notification(
        &self,
        booking: &BookingEmailData,
    ) -> BoxFuture<'_, NotificationResult, NotifyError> {
        let booking = booking.clone();
        Box::pin(async move {
            self.sent.lock().unwrap().push(booking);
            if self.fail {
                return Err(NotifyError::Provider {
                    status_code: 422,
                    message: "invalid from address".to_string(),
                });
            }
            Ok(NotificationResult {
                id: Some("email-1".to_string()),
                status: "sent".to_string(),
            })
        })
    }
}
