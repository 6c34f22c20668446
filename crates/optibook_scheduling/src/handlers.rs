// File: crates/optibook_scheduling/src/handlers.rs
use crate::availability::{bookable_dates, fetch_booked_start_times, is_date_selectable, resolve_slots};
use crate::flow::FlowError;
use crate::schedule::ClinicSchedule;
use crate::slots::SlotView;
use crate::submission::{submit_booking, BookingSelection, ContactForm, SubmissionError};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use optibook_common::{
    handle_json_result, validation_error, AppointmentStore, NotificationService, OptibookError,
    PatientType, ServiceType,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Shared state of the scheduling routes.
#[derive(Clone)]
pub struct SchedulingState {
    pub schedule: Arc<ClinicSchedule>,
    pub store: Arc<dyn AppointmentStore>,
    pub notifier: Arc<dyn NotificationService>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct SlotsQuery {
    /// Date in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-08-25"))]
    pub date: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotsResponse {
    pub date: String,
    pub slots: Vec<SlotView>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookableDatesResponse {
    pub dates: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateAppointmentRequest {
    pub patient_type: PatientType,
    pub service: ServiceType,
    /// YYYY-MM-DD
    #[cfg_attr(feature = "openapi", schema(example = "2025-08-25"))]
    pub date: String,
    /// Clinic wall-clock HH:MM of a generated slot
    #[cfg_attr(feature = "openapi", schema(example = "10:10"))]
    pub time: String,
    pub contact: ContactForm,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_sent: Option<bool>,
    /// Form field to highlight on validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppointmentResponse {
    fn failure(message: String, field: Option<&str>) -> Self {
        Self {
            success: false,
            message,
            appointment_id: None,
            notification_sent: None,
            field: field.map(str::to_string),
        }
    }
}

fn parse_selectable_date(raw: &str, schedule: &ClinicSchedule) -> Result<NaiveDate, OptibookError> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| validation_error("Invalid date format (YYYY-MM-DD)"))?;
    if !is_date_selectable(
        date,
        schedule.today(),
        schedule.horizon_months,
        &schedule.closed_days,
    ) {
        return Err(validation_error(format!("{} cannot be booked", date)));
    }
    Ok(date)
}

/// Handler listing every date that can currently be booked.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/bookable-dates",
    responses(
        (status = 200, description = "Selectable dates, ascending", body = BookableDatesResponse)
    ),
    tag = "Scheduling"
))]
pub async fn bookable_dates_handler(
    State(state): State<Arc<SchedulingState>>,
) -> Json<BookableDatesResponse> {
    let schedule = &state.schedule;
    let dates = bookable_dates(schedule.today(), schedule.horizon_months, &schedule.closed_days)
        .into_iter()
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect();
    Json(BookableDatesResponse { dates })
}

/// Handler returning the slots of one date with booked ones marked.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/slots",
    params(SlotsQuery),
    responses(
        (status = 200, description = "Slots of the day", body = SlotsResponse),
        (status = 400, description = "Malformed or non-bookable date")
    ),
    tag = "Scheduling"
))]
pub async fn slots_handler(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, Response> {
    handle_json_result(slots_for(&state, &query.date).await)
}

async fn slots_for(state: &SchedulingState, raw_date: &str) -> Result<SlotsResponse, OptibookError> {
    let date = parse_selectable_date(raw_date, &state.schedule)?;

    let booked = fetch_booked_start_times(state.store.as_ref(), date, &state.schedule).await;
    let slots = resolve_slots(date, &state.schedule, &booked)
        .iter()
        .map(SlotView::from)
        .collect();

    Ok(SlotsResponse {
        date: date.format("%Y-%m-%d").to_string(),
        slots,
    })
}

/// Handler booking an appointment: refuse booked slots, validate, insert once, notify once.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 200, description = "Appointment booked", body = AppointmentResponse),
        (status = 400, description = "Validation error", body = AppointmentResponse),
        (status = 403, description = "Online booking refused, call the clinic", body = AppointmentResponse),
        (status = 409, description = "Slot already booked", body = AppointmentResponse),
        (status = 502, description = "Store failure, safe to retry", body = AppointmentResponse)
    ),
    tag = "Scheduling"
))]
pub async fn create_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Response {
    let schedule = &state.schedule;
    let date = match parse_selectable_date(&payload.date, schedule) {
        Ok(date) => date,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AppointmentResponse::failure(e.to_string(), Some("date"))),
            )
                .into_response()
        }
    };

    let booked = fetch_booked_start_times(state.store.as_ref(), date, schedule).await;
    let slot = resolve_slots(date, schedule, &booked)
        .into_iter()
        .find(|slot| slot.wall_clock_key() == payload.time);
    if let Some(slot) = slot.as_ref().filter(|slot| slot.is_booked) {
        info!("Refusing {} {}: slot already booked", date, slot.wall_clock_key());
        return (
            StatusCode::CONFLICT,
            Json(AppointmentResponse::failure(
                FlowError::SlotBooked(slot.wall_clock_key()).to_string(),
                Some("time"),
            )),
        )
            .into_response();
    }
    let starts_at = slot.map(|slot| slot.starts_at);

    let selection = BookingSelection {
        patient_type: payload.patient_type,
        service: payload.service,
        starts_at,
    };

    match submit_booking(
        state.store.as_ref(),
        state.notifier.as_ref(),
        &schedule.phone,
        &selection,
        &payload.contact,
    )
    .await
    {
        Ok(outcome) => {
            info!("Appointment {} booked via API", outcome.appointment.id);
            Json(AppointmentResponse {
                success: true,
                message: "Your appointment has been booked.".to_string(),
                appointment_id: Some(outcome.appointment.id),
                notification_sent: Some(outcome.notification_sent),
                field: None,
            })
            .into_response()
        }
        Err(e) => {
            let status = match &e {
                SubmissionError::Validation { .. } => StatusCode::BAD_REQUEST,
                SubmissionError::PolicyRejected { .. } => StatusCode::FORBIDDEN,
                SubmissionError::Retryable(_) => StatusCode::BAD_GATEWAY,
                SubmissionError::NotOpen => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(AppointmentResponse::failure(e.to_string(), e.field())),
            )
                .into_response()
        }
    }
}
