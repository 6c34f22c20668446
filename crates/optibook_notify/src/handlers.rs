// --- File: crates/optibook_notify/src/handlers.rs ---
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use optibook_common::{BookingEmailData, NotificationService, NotifyError};
use optibook_config::{is_secret_set, EmailConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const ALLOWED_METHODS: &str = "GET,OPTIONS,PATCH,DELETE,POST,PUT";
pub const ALLOWED_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, \
    Content-Length, Content-MD5, Content-Type, Date, X-Api-Version";

/// Which email settings are present. Values are never exposed.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EmailStatus {
    pub has_resend_key: bool,
    pub has_admin_email: bool,
    pub has_from_email: bool,
}

impl EmailStatus {
    pub fn from_config(config: Option<&EmailConfig>) -> Self {
        match config {
            Some(email) => Self {
                has_resend_key: is_secret_set(email.api_key.as_ref()),
                has_admin_email: !email.admin_email.is_empty(),
                has_from_email: !email.from.is_empty(),
            },
            None => Self::default(),
        }
    }
}

/// Shared state of the notification routes.
#[derive(Clone)]
pub struct NotifyState {
    /// `None` when no email provider is configured; bookings are then only logged.
    pub notifier: Option<Arc<dyn NotificationService>>,
    pub email_status: EmailStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub booking_data: BookingEmailData,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    #[cfg_attr(feature = "openapi", schema(example = "Ada Lovelace"))]
    pub patient: String,
    #[cfg_attr(feature = "openapi", schema(example = "Monday, August 25, 2025 at 10:10 AM"))]
    pub appointment_time: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    /// Provider failure; the booking itself is unaffected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
    pub data: BookingSummary,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EmailStatusResponse {
    pub success: bool,
    pub message: String,
    pub env: EmailStatus,
}

fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
            details,
        }),
    )
        .into_response()
}

/// Absent, `null`, `false`, `0` and `""` all count as "no booking data".
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// Handler relaying one booking notification to clinic staff.
///
/// A provider failure still answers 200: the booking has already been stored.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/send-email",
    request_body = SendEmailRequest,
    responses(
        (status = 200, description = "Notification sent, or logged when no provider is configured", body = SendEmailResponse),
        (status = 400, description = "No booking data provided", body = ErrorBody),
        (status = 405, description = "Method not allowed", body = ErrorBody),
        (status = 500, description = "Malformed booking data", body = ErrorBody)
    ),
    tag = "Notifications"
))]
pub async fn send_email_handler(State(state): State<Arc<NotifyState>>, body: Bytes) -> Response {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let booking_value = payload.get("bookingData");
    if is_blank(booking_value) {
        error!("No booking data provided");
        return error_response(StatusCode::BAD_REQUEST, "No booking data provided", None);
    }

    let booking: BookingEmailData = match booking_value.cloned().map(serde_json::from_value) {
        Some(Ok(booking)) => booking,
        Some(Err(e)) => {
            error!("Malformed booking data: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                Some(e.to_string()),
            );
        }
        None => return error_response(StatusCode::BAD_REQUEST, "No booking data provided", None),
    };

    let summary = BookingSummary {
        patient: booking.customer_info.full_name(),
        appointment_time: booking.appointment_date_time(),
    };
    info!(
        patient = %summary.patient,
        email = %booking.customer_info.email,
        phone = %booking.customer_info.phone,
        appointment = %summary.appointment_time,
        service = %booking.appointment_type,
        patient_type = booking.patient_type.notification_label(),
        "New appointment booking received"
    );

    let Some(notifier) = state.notifier.as_ref() else {
        info!("No email provider configured, booking logged only");
        return Json(SendEmailResponse {
            success: true,
            message: "Booking notification logged successfully (no email service configured)"
                .to_string(),
            email_id: None,
            email_error: None,
            data: summary,
        })
        .into_response();
    };

    let response = match notifier.send_booking_notification(&booking).await {
        Ok(result) => SendEmailResponse {
            success: true,
            message: "Booking notification sent successfully".to_string(),
            email_id: result.id,
            email_error: None,
            data: summary,
        },
        Err(NotifyError::Provider { message, .. }) => {
            warn!("Email provider rejected booking notification: {}", message);
            SendEmailResponse {
                success: true,
                message: "Booking logged, but email failed to send".to_string(),
                email_id: None,
                email_error: Some(message),
                data: summary,
            }
        }
        Err(e) => {
            warn!("Email sending failed: {}", e);
            SendEmailResponse {
                success: true,
                message: "Booking logged, but email service unavailable".to_string(),
                email_id: None,
                email_error: Some(e.to_string()),
                data: summary,
            }
        }
    };
    Json(response).into_response()
}

/// CORS preflight for cross-origin widget embedding.
pub async fn preflight_handler() -> Response {
    (
        StatusCode::OK,
        [
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOWED_METHODS),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOWED_HEADERS),
            ),
        ],
    )
        .into_response()
}

pub async fn method_not_allowed_handler() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
}

/// Handler reporting which email settings are present.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/test",
    responses(
        (status = 200, description = "Email configuration presence flags", body = EmailStatusResponse)
    ),
    tag = "Notifications"
))]
pub async fn email_status_handler(
    State(state): State<Arc<NotifyState>>,
) -> Json<EmailStatusResponse> {
    info!("Email status requested: {:?}", state.email_status);
    Json(EmailStatusResponse {
        success: true,
        message: "Test API working".to_string(),
        env: state.email_status,
    })
}
