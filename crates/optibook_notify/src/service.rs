//! Resend email implementation of the notification service.

use crate::email::{compose, DEFAULT_CLINIC_NAME};
use optibook_common::{
    BookingEmailData, BoxFuture, NotificationResult, NotificationService, NotifyError, HTTP_CLIENT,
};
use optibook_config::{is_secret_set, EmailConfig};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

#[derive(Deserialize, Debug)]
struct SendResponse {
    id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ProviderError {
    #[serde(default)]
    message: Option<String>,
}

/// Sends one plain-text email per booking to the clinic's admin address.
#[derive(Debug, Clone)]
pub struct ResendNotificationService {
    api_key: String,
    from: String,
    admin_email: String,
    api_base: String,
    clinic_name: String,
    client: Client,
}

impl ResendNotificationService {
    /// Fails with `NotConfigured` when the API key is absent or was never resolved
    /// from the environment.
    pub fn from_config(config: &EmailConfig, clinic_name: &str) -> Result<Self, NotifyError> {
        if !is_secret_set(config.api_key.as_ref()) {
            return Err(NotifyError::NotConfigured);
        }
        let api_key = config.api_key.clone().unwrap_or_default();
        Ok(Self {
            api_key,
            from: config.from.clone(),
            admin_email: config.admin_email.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            clinic_name: if clinic_name.is_empty() {
                DEFAULT_CLINIC_NAME.to_string()
            } else {
                clinic_name.to_string()
            },
            client: HTTP_CLIENT.clone(),
        })
    }

    async fn send(&self, booking: BookingEmailData) -> Result<NotificationResult, NotifyError> {
        let email = compose(&booking, &self.from, &self.admin_email, &self.clinic_name);
        let response = self
            .client
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&email)
            .send()
            .await
            .map_err(|e| {
                error!("Email provider request failed: {}", e);
                NotifyError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let parsed: ProviderError = serde_json::from_str(&body).unwrap_or_default();
            let message = parsed.message.unwrap_or(body);
            error!("Email provider returned {}: {}", status, message);
            return Err(NotifyError::Provider {
                status_code: status.as_u16(),
                message,
            });
        }

        let sent: SendResponse = serde_json::from_str(&body)
            .map_err(|e| NotifyError::Request(format!("Unreadable provider response: {}", e)))?;
        info!("Booking email sent (id: {:?})", sent.id);
        Ok(NotificationResult {
            id: sent.id,
            status: "sent".to_string(),
        })
    }
}

impl NotificationService for ResendNotificationService {
    fn send_booking_notification(
        &self,
        booking: &BookingEmailData,
    ) -> BoxFuture<'_, NotificationResult, NotifyError> {
        Box::pin(self.send(booking.clone()))
    }
}
