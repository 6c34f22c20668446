//! Staff notification email composition.

use optibook_common::BookingEmailData;
use serde::Serialize;

pub const DEFAULT_CLINIC_NAME: &str = "GoTo Optical";

/// Request body of the provider's `POST /emails`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
}

/// `New Appointment: First Last - <date> at <time>`
pub fn subject(booking: &BookingEmailData) -> String {
    format!(
        "New Appointment: {} - {}",
        booking.customer_info.full_name(),
        booking.appointment_date_time()
    )
}

/// Plain-text body. Insurance and reason for visit appear only when supplied.
pub fn body(booking: &BookingEmailData, clinic_name: &str) -> String {
    let customer = &booking.customer_info;
    let mut lines = vec![
        format!("New Appointment Booking - {}", clinic_name),
        String::new(),
        format!("Patient: {}", customer.full_name()),
        format!("Email: {}", customer.email),
        format!("Phone: {}", customer.phone),
        format!("Date of Birth: {}", customer.date_of_birth),
        String::new(),
        "Appointment Details:".to_string(),
        format!("- Date & Time: {}", booking.appointment_date_time()),
        format!(
            "- Patient Type: {}",
            booking.patient_type.notification_label()
        ),
        format!(
            "- Appointment Type: {}",
            booking.appointment_type.notification_label()
        ),
    ];

    let extras: Vec<String> = [
        customer
            .insurance
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(|v| format!("Insurance: {}", v)),
        customer
            .reason_for_visit
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(|v| format!("Reason for Visit: {}", v)),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !extras.is_empty() {
        lines.push(String::new());
        lines.extend(extras);
    }

    lines.join("\n")
}

pub fn compose(booking: &BookingEmailData, from: &str, to: &str, clinic_name: &str) -> OutgoingEmail {
    OutgoingEmail {
        from: from.to_string(),
        to: vec![to.to_string()],
        subject: subject(booking),
        text: body(booking, clinic_name),
    }
}
