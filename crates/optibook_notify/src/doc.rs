// File: crates/optibook_notify/src/doc.rs
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    BookingSummary, EmailStatus, EmailStatusResponse, ErrorBody, SendEmailRequest,
    SendEmailResponse,
};
use optibook_common::{BookingEmailData, CustomerInfo, PatientType, ServiceType};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::send_email_handler,
        crate::handlers::email_status_handler
    ),
    components(
        schemas(
            SendEmailRequest,
            SendEmailResponse,
            BookingSummary,
            ErrorBody,
            EmailStatus,
            EmailStatusResponse,
            BookingEmailData,
            CustomerInfo,
            PatientType,
            ServiceType
        )
    ),
    tags(
        (name = "Notifications", description = "Staff booking notifications")
    ),
    servers(
        (url = "/api", description = "Notification API server")
    )
)]
pub struct NotifyApiDoc;
