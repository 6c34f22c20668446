// --- File: crates/optibook_common/src/models.rs ---
//! Booking data shared by the scheduling, store and notification crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the visitor has been seen at the clinic before.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientType {
    New,
    Current,
}

impl PatientType {
    /// Wording used in staff notifications.
    pub fn notification_label(self) -> &'static str {
        match self {
            PatientType::New => "New Patient",
            PatientType::Current => "Existing Patient",
        }
    }
}

/// The two services that can be booked online.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "general")]
    GeneralOptometry,
    #[serde(rename = "contact-lens")]
    ContactLensFitting,
}

impl ServiceType {
    /// Value written to the `service` column of the appointment store.
    pub fn store_label(self) -> &'static str {
        match self {
            ServiceType::GeneralOptometry => "General Optometry",
            ServiceType::ContactLensFitting => "Contact Lens Fitting",
        }
    }

    /// Wording used in staff notifications.
    pub fn notification_label(self) -> &'static str {
        match self {
            ServiceType::GeneralOptometry => "General Eye Exam",
            ServiceType::ContactLensFitting => "Contact Lens Consultation",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.store_label())
    }
}

/// One booking attempt, in the shape written to the appointment store.
///
/// `starts_at` is an absolute instant; it serializes as RFC 3339 UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An appointment as returned by the store after a successful insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAppointment {
    pub id: String,
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub service: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl StoredAppointment {
    pub fn from_request(id: impl Into<String>, request: AppointmentRequest) -> Self {
        Self {
            id: id.into(),
            customer_email: request.customer_email,
            customer_name: request.customer_name,
            service: request.service,
            starts_at: request.starts_at,
            notes: request.notes,
        }
    }
}

/// A reservation row as read back for slot blocking.
///
/// Bundled stores return `starts_at` as an RFC 3339 UTC instant. The resolver still
/// accepts offset-less values and reads them as clinic wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedStart {
    pub starts_at: String,
}

/// Contact details entered in the last booking step, as sent to the notification endpoint.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_for_visit: Option<String>,
}

impl CustomerInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payload of the `send-email` endpoint (`{ "bookingData": ... }`).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingEmailData {
    pub patient_type: PatientType,
    pub appointment_type: ServiceType,
    pub appointment_date: String,
    pub appointment_time: String,
    pub customer_info: CustomerInfo,
}

impl BookingEmailData {
    /// "<date> at <time>", as used in subjects and responses.
    pub fn appointment_date_time(&self) -> String {
        format!("{} at {}", self.appointment_date, self.appointment_time)
    }
}
