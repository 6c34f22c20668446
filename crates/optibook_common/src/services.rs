// --- File: crates/optibook_common/src/services.rs ---
//! Service abstractions for external services.
//!
//! The booking core talks to two collaborators it does not own: the appointment store
//! (insert one row, list rows in a time range) and the notification capability (send one
//! booking alert to clinic staff). These traits decouple the booking logic from the
//! concrete adapters so the flow can be driven against in-memory fakes in tests.

use crate::models::{AppointmentRequest, BookingEmailData, ReservedStart, StoredAppointment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// PostgreSQL `insufficient_privilege`, raised by row-level security policies.
pub const POLICY_REJECTION_CODE: &str = "42501";

/// Failures of the appointment store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store refused the write for access/policy reasons; retrying will not help.
    #[error("Store rejected the request by policy: {0}")]
    PolicyRejected(String),

    /// Transport or server failure; the same request may succeed later.
    #[error("Store request failed: {0}")]
    Request(String),

    /// The store answered with something that is not an appointment record.
    #[error("Store returned an invalid record: {0}")]
    InvalidRecord(String),

    /// No store has been configured for this deployment.
    #[error("Appointment store is not configured")]
    NotConfigured,
}

impl StoreError {
    /// Classifies a backend failure given its error code and message.
    pub fn from_backend(code: Option<&str>, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == Some(POLICY_REJECTION_CODE) || message.contains("row-level security") {
            StoreError::PolicyRejected(message)
        } else {
            StoreError::Request(message)
        }
    }

    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, StoreError::PolicyRejected(_))
    }
}

/// Failures of the notification capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Notification service is not configured")]
    NotConfigured,

    #[error("Notification provider returned an error: {message} (Status: {status_code})")]
    Provider { status_code: u16, message: String },

    #[error("Notification request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Request(err.to_string())
    }
}

/// Durable storage of confirmed appointments.
pub trait AppointmentStore: Send + Sync {
    /// Insert one appointment and return the created record.
    fn insert_appointment(
        &self,
        request: AppointmentRequest,
    ) -> BoxFuture<'_, StoredAppointment, StoreError>;

    /// List reservation start times in the half-open range `[start, end)`.
    fn reserved_starts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<ReservedStart>, StoreError>;
}

/// Sends a human-readable booking alert to clinic staff.
pub trait NotificationService: Send + Sync {
    fn send_booking_notification(
        &self,
        booking: &BookingEmailData,
    ) -> BoxFuture<'_, NotificationResult, NotifyError>;
}

/// Provides the configured service instances to the HTTP layer.
pub trait ServiceFactory: Send + Sync {
    fn appointment_store(&self) -> Arc<dyn AppointmentStore>;

    /// `None` when no notification channel is configured; callers log instead.
    fn notification_service(&self) -> Option<Arc<dyn NotificationService>>;
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResult {
    /// Provider message id, when the provider returns one.
    pub id: Option<String>,
    pub status: String,
}
