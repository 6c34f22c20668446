// --- File: crates/services/optibook_backend/src/app_state.rs ---
use crate::service_factory::OptibookServiceFactory;
use optibook_common::{external_service_error, OptibookError, ServiceFactory};
use optibook_config::AppConfig;
use optibook_notify::{EmailStatus, LogOnlyNotifier, NotifyState};
use optibook_scheduling::{ClinicSchedule, SchedulingState};
use std::sync::Arc;

/// Application state shared by all routers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service_factory: Arc<dyn ServiceFactory>,
    pub schedule: Arc<ClinicSchedule>,
}

impl AppState {
    /// Validates the schedule and initializes the configured services.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, OptibookError> {
        let factory = OptibookServiceFactory::new(config.clone())
            .await
            .map_err(|e| external_service_error("appointment store", e.to_string()))?;
        Self::with_service_factory(config, Arc::new(factory))
    }

    pub fn with_service_factory(
        config: Arc<AppConfig>,
        service_factory: Arc<dyn ServiceFactory>,
    ) -> Result<Self, OptibookError> {
        let schedule = Arc::new(ClinicSchedule::from_config(&config)?);
        Ok(Self {
            config,
            service_factory,
            schedule,
        })
    }

    /// State of the slot and appointment routes. Without an email provider the
    /// server-side submission logs its notifications.
    pub fn scheduling_state(&self) -> Arc<SchedulingState> {
        let notifier = self
            .service_factory
            .notification_service()
            .unwrap_or_else(|| Arc::new(LogOnlyNotifier));
        Arc::new(SchedulingState {
            schedule: self.schedule.clone(),
            store: self.service_factory.appointment_store(),
            notifier,
        })
    }

    pub fn notify_state(&self) -> Arc<NotifyState> {
        Arc::new(NotifyState {
            notifier: self.service_factory.notification_service(),
            email_status: EmailStatus::from_config(self.config.email.as_ref()),
        })
    }
}
