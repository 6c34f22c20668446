// File: crates/optibook_scheduling/src/doc.rs
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    AppointmentResponse, BookableDatesResponse, CreateAppointmentRequest, SlotsQuery,
    SlotsResponse,
};
use crate::slots::SlotView;
use crate::submission::ContactForm;
use optibook_common::{PatientType, ServiceType};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::bookable_dates_handler,
        crate::handlers::slots_handler,
        crate::handlers::create_appointment_handler
    ),
    components(
        schemas(
            SlotsQuery,
            SlotsResponse,
            SlotView,
            BookableDatesResponse,
            CreateAppointmentRequest,
            ContactForm,
            AppointmentResponse,
            PatientType,
            ServiceType
        )
    ),
    tags(
        (name = "Scheduling", description = "Clinic slot availability and booking API")
    ),
    servers(
        (url = "/api", description = "Scheduling API server")
    )
)]
pub struct SchedulingApiDoc;
