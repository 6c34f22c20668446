// --- File: crates/services/optibook_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Picks the appointment store and the notification channel from the configuration.
//! With the store disabled the backend runs on the in-memory store; with email
//! disabled bookings are only logged.
use optibook_common::{
    is_email_enabled, is_store_enabled, log_result, AppointmentStore, NotificationService,
    ServiceFactory, StoreError,
};
use optibook_config::AppConfig;
use optibook_notify::ResendNotificationService;
use optibook_store::{store_from_config, InMemoryAppointmentStore};
use std::sync::Arc;
use tracing::{info, warn};

pub struct OptibookServiceFactory {
    appointment_store: Arc<dyn AppointmentStore>,
    notification_service: Option<Arc<dyn NotificationService>>,
}

impl OptibookServiceFactory {
    /// Builds the configured services. A store that is enabled but cannot be reached
    /// is an error; an email provider that is enabled but lacks its key is not.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, StoreError> {
        let appointment_store: Arc<dyn AppointmentStore> = match config.store.as_ref() {
            Some(store) if is_store_enabled(&config) => {
                info!("Initializing {:?} appointment store...", store.backend);
                log_result(
                    store_from_config(store).await,
                    "Appointment store ready",
                    "Failed to initialize appointment store",
                )?
            }
            _ => {
                warn!("Appointment store disabled, bookings are kept in memory only");
                Arc::new(InMemoryAppointmentStore::new())
            }
        };

        let notification_service: Option<Arc<dyn NotificationService>> =
            match config.email.as_ref() {
                Some(email) if is_email_enabled(&config) => {
                    match ResendNotificationService::from_config(email, &config.clinic.name) {
                        Ok(service) => {
                            info!("Email notifications go to {}", email.admin_email);
                            Some(Arc::new(service))
                        }
                        Err(e) => {
                            warn!("Email enabled but unusable ({}), logging bookings only", e);
                            None
                        }
                    }
                }
                _ => {
                    info!("Email disabled, logging bookings only");
                    None
                }
            };

        Ok(Self::with_services(appointment_store, notification_service))
    }

    pub fn with_services(
        appointment_store: Arc<dyn AppointmentStore>,
        notification_service: Option<Arc<dyn NotificationService>>,
    ) -> Self {
        Self {
            appointment_store,
            notification_service,
        }
    }
}

impl ServiceFactory for OptibookServiceFactory {
    fn appointment_store(&self) -> Arc<dyn AppointmentStore> {
        self.appointment_store.clone()
    }

    fn notification_service(&self) -> Option<Arc<dyn NotificationService>> {
        self.notification_service.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optibook_config::{EmailConfig, StoreBackend, StoreConfig};

    #[tokio::test]
    async fn test_defaults_to_memory_and_log_only() {
        let config = Arc::new(AppConfig::with_server("127.0.0.1", 8080));
        let factory = OptibookServiceFactory::new(config).await.unwrap();
        assert!(factory.notification_service().is_none());
    }

    #[tokio::test]
    async fn test_unresolved_email_key_falls_back_to_logging() {
        let mut config = AppConfig::with_server("127.0.0.1", 8080);
        config.use_email = true;
        config.email = Some(EmailConfig {
            api_key: Some("secret_from_env".to_string()),
            from: "GoTo Optical <onboarding@resend.dev>".to_string(),
            admin_email: "info@gotooptical.com".to_string(),
            api_base: "https://api.resend.com".to_string(),
        });
        let factory = OptibookServiceFactory::new(Arc::new(config)).await.unwrap();
        assert!(factory.notification_service().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_fatal() {
        let mut config = AppConfig::with_server("127.0.0.1", 8080);
        config.use_store = true;
        config.store = Some(StoreConfig {
            backend: StoreBackend::Supabase,
            url: "https://project.supabase.co".to_string(),
            api_key: None,
            table: "appointments".to_string(),
        });
        let result = OptibookServiceFactory::new(Arc::new(config)).await;
        assert!(matches!(result, Err(StoreError::NotConfigured)));
    }
}
