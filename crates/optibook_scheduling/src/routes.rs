// --- File: crates/optibook_scheduling/src/routes.rs ---
use crate::handlers::{
    bookable_dates_handler, create_appointment_handler, slots_handler, SchedulingState,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates the router for date/slot lookup and appointment submission.
pub fn routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/bookable-dates", get(bookable_dates_handler))
        .route("/slots", get(slots_handler))
        .route("/appointments", post(create_appointment_handler))
        .with_state(state)
}
