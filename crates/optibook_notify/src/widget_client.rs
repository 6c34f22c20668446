//! Notifier that forwards bookings to a backend `send-email` endpoint.
//!
//! This is the path the browser widget takes: it never holds provider keys and
//! only reports whether the backend accepted the booking.

use crate::handlers::SendEmailRequest;
use optibook_common::{
    BookingEmailData, BoxFuture, NotificationResult, NotificationService, NotifyError, HTTP_CLIENT,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct SendEmailReply {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    email_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpBookingNotifier {
    endpoint: String,
    client: Client,
}

impl HttpBookingNotifier {
    /// `endpoint` is the full URL, e.g. `https://clinic.example/api/send-email`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: HTTP_CLIENT.clone(),
        }
    }

    async fn post(&self, booking: BookingEmailData) -> Result<NotificationResult, NotifyError> {
        debug!("Posting booking notification to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SendEmailRequest {
                booking_data: booking,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let reply: SendEmailReply = serde_json::from_str(&body).unwrap_or_default();
        if !status.is_success() {
            let message = reply.error.unwrap_or(body);
            error!("Backend send-email returned {}: {}", status, message);
            return Err(NotifyError::Provider {
                status_code: status.as_u16(),
                message,
            });
        }

        Ok(NotificationResult {
            id: reply.email_id,
            status: reply.message.unwrap_or_else(|| "accepted".to_string()),
        })
    }
}

impl NotificationService for HttpBookingNotifier {
    fn send_booking_notification(
        &self,
        booking: &BookingEmailData,
    ) -> BoxFuture<'_, NotificationResult, NotifyError> {
        Box::pin(self.post(booking.clone()))
    }
}
