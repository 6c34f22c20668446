// --- File: crates/optibook_common/src/lib.rs ---

pub mod error; // Error handling
pub mod features; // Runtime feature switches
pub mod http; // HTTP utilities
pub mod logging; // Logging setup
pub mod models; // Shared booking data
pub mod routes; // Common routes
pub mod services; // Store and notification abstractions

pub use routes::routes;

pub use error::{
    config_error, external_service_error, validation_error, Context, HttpStatusCode,
    OptibookError,
};

pub use http::{
    client::{create_client, HTTP_CLIENT},
    handle_json_result, IntoHttpResponse,
};

pub use logging::{init, init_from_config, init_with_level, log_error, log_result};

pub use features::{is_email_enabled, is_feature_enabled, is_store_enabled};

pub use models::{
    AppointmentRequest, BookingEmailData, CustomerInfo, PatientType, ReservedStart, ServiceType,
    StoredAppointment,
};
pub use services::{
    AppointmentStore, BoxFuture, NotificationResult, NotificationService, NotifyError,
    ServiceFactory, StoreError,
};
