// --- File: crates/optibook_scheduling/src/submission.rs ---
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use optibook_common::{
    AppointmentRequest, AppointmentStore, BookingEmailData, CustomerInfo, NotificationService,
    PatientType, ServiceType, StoreError, StoredAppointment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

pub const GENERIC_FAILURE_MESSAGE: &str = "We couldn't book your appointment. Please try again.";

/// Message shown when the store refuses bookings; retrying online will not help.
pub fn policy_rejection_message(clinic_phone: &str) -> String {
    format!(
        "Booking system temporarily unavailable. Please call us at {} to book your appointment.",
        clinic_phone
    )
}

/// Contact details collected in the last booking step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ContactForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub insurance: Option<bool>,
    #[serde(default)]
    pub reason_for_visit: Option<String>,
    #[serde(default)]
    pub referral_source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub consent: bool,
}

/// What was chosen in the earlier steps of the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSelection {
    pub patient_type: PatientType,
    pub service: ServiceType,
    pub starts_at: Option<DateTime<Tz>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub appointment: StoredAppointment,
    /// False when the staff alert could not be sent; the booking stands regardless.
    pub notification_sent: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Rejected before any external call.
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("{message}")]
    PolicyRejected { message: String },

    /// The form stays filled in; the user may submit again.
    #[error("We couldn't book your appointment. Please try again.")]
    Retryable(StoreError),

    #[error("The booking form is not open")]
    NotOpen,
}

impl SubmissionError {
    fn validation(field: &'static str, message: &str) -> Self {
        SubmissionError::Validation {
            field,
            message: message.to_string(),
        }
    }

    /// The form field to highlight, for validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SubmissionError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn non_empty_opt(value: Option<&String>) -> Option<&str> {
    value.and_then(|v| non_empty(v))
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Step 1: the checks that run before any external call.
pub fn validate(
    starts_at: Option<DateTime<Tz>>,
    form: &ContactForm,
) -> Result<DateTime<Tz>, SubmissionError> {
    let starts_at = starts_at.ok_or_else(|| {
        SubmissionError::validation("appointment_time", "Please choose an appointment time.")
    })?;
    if non_empty(&form.email).is_none() {
        return Err(SubmissionError::validation(
            "email",
            "Please enter your email address.",
        ));
    }
    if !form.consent {
        return Err(SubmissionError::validation(
            "consent",
            "Please agree to be contacted about your appointment.",
        ));
    }
    Ok(starts_at)
}

/// First and last name joined by a space; `None` when both are blank.
pub fn customer_name(form: &ContactForm) -> Option<String> {
    let parts: Vec<&str> = [form.first_name.as_str(), form.last_name.as_str()]
        .into_iter()
        .filter_map(non_empty)
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Free-text notes for the store: supplied fields only, `Label: value` joined by ` | `.
pub fn build_notes(form: &ContactForm) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(reason) = non_empty_opt(form.reason_for_visit.as_ref()) {
        parts.push(format!("Reason for visit: {}", reason));
    }
    if let Some(phone) = non_empty(&form.phone) {
        parts.push(format!("Phone: {}", phone));
    }
    if let Some(dob) = non_empty(&form.date_of_birth) {
        parts.push(format!("Date of birth: {}", dob));
    }
    if let Some(insurance) = form.insurance {
        parts.push(format!("Insurance: {}", yes_no(insurance)));
    }
    if let Some(referral) = non_empty_opt(form.referral_source.as_ref()) {
        parts.push(format!("Referral: {}", referral));
    }
    if let Some(notes) = non_empty_opt(form.notes.as_ref()) {
        parts.push(format!("Notes: {}", notes));
    }
    (!parts.is_empty()).then(|| parts.join(" | "))
}

/// Step 2: the row written to the store. `starts_at` becomes an absolute UTC instant.
pub fn build_request(
    service: ServiceType,
    starts_at: DateTime<Tz>,
    form: &ContactForm,
) -> AppointmentRequest {
    AppointmentRequest {
        customer_email: form.email.trim().to_string(),
        customer_name: customer_name(form),
        service: Some(service.store_label().to_string()),
        starts_at: starts_at.with_timezone(&Utc),
        notes: build_notes(form),
    }
}

/// The staff notification payload, with date and time rendered in clinic local time.
pub fn build_email_data(
    patient_type: PatientType,
    service: ServiceType,
    starts_at: DateTime<Tz>,
    form: &ContactForm,
) -> BookingEmailData {
    BookingEmailData {
        patient_type,
        appointment_type: service,
        appointment_date: starts_at.format("%A, %B %-d, %Y").to_string(),
        appointment_time: starts_at.format("%-I:%M %p").to_string(),
        customer_info: CustomerInfo {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            date_of_birth: form.date_of_birth.trim().to_string(),
            insurance: form.insurance.map(|flag| yes_no(flag).to_string()),
            reason_for_visit: non_empty_opt(form.reason_for_visit.as_ref()).map(str::to_string),
        },
    }
}

/// Validates, inserts once, then notifies once.
///
/// The insert is awaited before the notification is issued. A notification failure
/// is logged and reported through `notification_sent`; it never fails the booking.
pub async fn submit_booking(
    store: &dyn AppointmentStore,
    notifier: &dyn NotificationService,
    clinic_phone: &str,
    selection: &BookingSelection,
    form: &ContactForm,
) -> Result<SubmissionOutcome, SubmissionError> {
    let starts_at = validate(selection.starts_at, form)?;
    let request = build_request(selection.service, starts_at, form);

    let appointment = store.insert_appointment(request).await.map_err(|e| {
        if e.is_policy_rejection() {
            warn!("Appointment insert refused by store policy: {}", e);
            SubmissionError::PolicyRejected {
                message: policy_rejection_message(clinic_phone),
            }
        } else {
            error!("Appointment insert failed: {}", e);
            SubmissionError::Retryable(e)
        }
    })?;
    info!(
        "Booked appointment {} at {}",
        appointment.id,
        starts_at.to_rfc3339()
    );

    let email = build_email_data(selection.patient_type, selection.service, starts_at, form);
    let notification_sent = match notifier.send_booking_notification(&email).await {
        Ok(result) => {
            info!(
                "Booking notification {} (id: {:?})",
                result.status, result.id
            );
            true
        }
        Err(e) => {
            warn!(
                "Booking {} saved but notification failed: {}",
                appointment.id, e
            );
            false
        }
    };

    Ok(SubmissionOutcome {
        appointment,
        notification_sent,
    })
}
