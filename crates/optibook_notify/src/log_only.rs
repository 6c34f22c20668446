//! Notification fallback for deployments without an email provider.

use optibook_common::{
    BookingEmailData, BoxFuture, NotificationResult, NotificationService, NotifyError,
};
use tracing::info;

/// Logs the booking instead of sending it anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyNotifier;

impl NotificationService for LogOnlyNotifier {
    fn send_booking_notification(
        &self,
        booking: &BookingEmailData,
    ) -> BoxFuture<'_, NotificationResult, NotifyError> {
        let customer = &booking.customer_info;
        info!(
            patient = %customer.full_name(),
            email = %customer.email,
            phone = %customer.phone,
            appointment = %booking.appointment_date_time(),
            service = %booking.appointment_type,
            patient_type = booking.patient_type.notification_label(),
            "New appointment booking received (no email service configured)"
        );
        Box::pin(async {
            Ok(NotificationResult {
                id: None,
                status: "logged".to_string(),
            })
        })
    }
}
