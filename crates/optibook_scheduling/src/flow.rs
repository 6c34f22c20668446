// --- File: crates/optibook_scheduling/src/flow.rs ---
//! Booking state machine.
//!
//! [`apply`] is the pure transition function over [`BookingFlowState`]. [`BookingFlow`]
//! wraps it with the two asynchronous steps (reservation query on date selection and
//! submission) and the open/close lifecycle of the booking widget.

use crate::availability::{fetch_booked_start_times, is_date_selectable, resolve_slots, wall_clock_key};
use crate::schedule::ClinicSchedule;
use crate::slots::TimeSlot;
use crate::submission::{
    submit_booking, BookingSelection, ContactForm, SubmissionError, SubmissionOutcome,
};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use optibook_common::{AppointmentStore, NotificationService, PatientType, ServiceType};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BookingStep {
    PatientType,
    AppointmentType,
    DateTime,
    FinishScheduling,
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingStep::PatientType => "patient type",
            BookingStep::AppointmentType => "appointment type",
            BookingStep::DateTime => "date and time",
            BookingStep::FinishScheduling => "finish scheduling",
        };
        f.write_str(name)
    }
}

/// Session-local state of one booking widget.
///
/// `selected_time` is `Some` only in `FinishScheduling`. `booked_start_times` is
/// replaced, never merged, whenever `selected_date` changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFlowState {
    pub step: BookingStep,
    pub patient_type: Option<PatientType>,
    pub service: Option<ServiceType>,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<DateTime<Tz>>,
    pub booked_start_times: HashSet<String>,
}

impl Default for BookingFlowState {
    fn default() -> Self {
        Self {
            step: BookingStep::PatientType,
            patient_type: None,
            service: None,
            selected_date: None,
            selected_time: None,
            booked_start_times: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    ChoosePatientType(PatientType),
    ChooseService(ServiceType),
    /// A date was picked and its reservations were looked up.
    DateSelected {
        date: NaiveDate,
        booked_start_times: HashSet<String>,
    },
    ChooseSlot(DateTime<Tz>),
    Back,
}

impl FlowEvent {
    fn name(&self) -> &'static str {
        match self {
            FlowEvent::ChoosePatientType(_) => "choose patient type",
            FlowEvent::ChooseService(_) => "choose service",
            FlowEvent::DateSelected { .. } => "select date",
            FlowEvent::ChooseSlot(_) => "choose slot",
            FlowEvent::Back => "back",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Cannot {event} during the {step} step")]
    InvalidTransition {
        step: BookingStep,
        event: &'static str,
    },
    #[error("{0} cannot be booked")]
    DateNotSelectable(NaiveDate),
    #[error("Select a date first")]
    NoDateSelected,
    #[error("The {0} slot is already booked")]
    SlotBooked(String),
    #[error("No appointment starts at {0} on the selected date")]
    SlotNotOffered(String),
    #[error("The booking form is not open")]
    NotOpen,
}

/// Applies one event. Illegal events leave the state untouched and return an error.
pub fn apply(
    state: &BookingFlowState,
    event: FlowEvent,
    schedule: &ClinicSchedule,
) -> Result<BookingFlowState, FlowError> {
    let invalid = |event: &FlowEvent| FlowError::InvalidTransition {
        step: state.step,
        event: event.name(),
    };

    let mut next = state.clone();
    match (state.step, event) {
        (BookingStep::PatientType, FlowEvent::ChoosePatientType(patient_type)) => {
            next.patient_type = Some(patient_type);
            next.step = BookingStep::AppointmentType;
        }
        (BookingStep::AppointmentType, FlowEvent::ChooseService(service)) => {
            next.service = Some(service);
            next.step = BookingStep::DateTime;
        }
        (BookingStep::AppointmentType, FlowEvent::Back) => {
            next.step = BookingStep::PatientType;
        }
        (
            BookingStep::DateTime,
            FlowEvent::DateSelected {
                date,
                booked_start_times,
            },
        ) => {
            next.selected_date = Some(date);
            next.booked_start_times = booked_start_times;
        }
        (BookingStep::DateTime, FlowEvent::ChooseSlot(starts_at)) => {
            let date = state.selected_date.ok_or(FlowError::NoDateSelected)?;
            let key = wall_clock_key(&starts_at);
            let offered = resolve_slots(date, schedule, &state.booked_start_times)
                .into_iter()
                .find(|slot| slot.starts_at == starts_at)
                .ok_or_else(|| FlowError::SlotNotOffered(key.clone()))?;
            if offered.is_booked {
                return Err(FlowError::SlotBooked(key));
            }
            next.selected_time = Some(starts_at);
            next.step = BookingStep::FinishScheduling;
        }
        (BookingStep::DateTime, FlowEvent::Back) => {
            next.step = BookingStep::AppointmentType;
        }
        (BookingStep::FinishScheduling, FlowEvent::Back) => {
            next.selected_time = None;
            next.step = BookingStep::DateTime;
        }
        (_, event) => return Err(invalid(&event)),
    }
    Ok(next)
}

/// One booking widget instance: its state plus the collaborators it calls.
pub struct BookingFlow {
    state: BookingFlowState,
    is_open: bool,
    store: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn NotificationService>,
    schedule: Arc<ClinicSchedule>,
}

impl BookingFlow {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn NotificationService>,
        schedule: Arc<ClinicSchedule>,
    ) -> Self {
        Self {
            state: BookingFlowState::default(),
            is_open: false,
            store,
            notifier,
            schedule,
        }
    }

    /// Opens the widget with a fresh state.
    pub fn open(&mut self) {
        self.state = BookingFlowState::default();
        self.is_open = true;
    }

    /// Closes the widget; an in-flight result arriving later is simply dropped.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn state(&self) -> &BookingFlowState {
        &self.state
    }

    fn dispatch(&mut self, event: FlowEvent) -> Result<(), FlowError> {
        if !self.is_open {
            return Err(FlowError::NotOpen);
        }
        self.state = apply(&self.state, event, &self.schedule)?;
        Ok(())
    }

    pub fn choose_patient_type(&mut self, patient_type: PatientType) -> Result<(), FlowError> {
        self.dispatch(FlowEvent::ChoosePatientType(patient_type))
    }

    pub fn choose_service(&mut self, service: ServiceType) -> Result<(), FlowError> {
        self.dispatch(FlowEvent::ChooseService(service))
    }

    pub fn back(&mut self) -> Result<(), FlowError> {
        self.dispatch(FlowEvent::Back)
    }

    /// Selects `date` relative to the clinic's current date.
    pub async fn select_date(&mut self, date: NaiveDate) -> Result<Vec<TimeSlot>, FlowError> {
        let today = self.schedule.today();
        self.select_date_as_of(date, today).await
    }

    /// Selects `date`, loads its reservations (failing open) and returns the resolved slots.
    pub async fn select_date_as_of(
        &mut self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Vec<TimeSlot>, FlowError> {
        if !self.is_open {
            return Err(FlowError::NotOpen);
        }
        if self.state.step != BookingStep::DateTime {
            return Err(FlowError::InvalidTransition {
                step: self.state.step,
                event: "select date",
            });
        }
        if !is_date_selectable(
            date,
            today,
            self.schedule.horizon_months,
            &self.schedule.closed_days,
        ) {
            return Err(FlowError::DateNotSelectable(date));
        }

        let booked_start_times =
            fetch_booked_start_times(self.store.as_ref(), date, &self.schedule).await;
        debug!("Selected {} with {} booked slot(s)", date, booked_start_times.len());
        self.dispatch(FlowEvent::DateSelected {
            date,
            booked_start_times,
        })?;
        Ok(self.slots())
    }

    /// Slots for the selected date; empty before a date is chosen.
    pub fn slots(&self) -> Vec<TimeSlot> {
        match self.state.selected_date {
            Some(date) => resolve_slots(date, &self.schedule, &self.state.booked_start_times),
            None => Vec::new(),
        }
    }

    pub fn choose_slot(&mut self, starts_at: DateTime<Tz>) -> Result<(), FlowError> {
        self.dispatch(FlowEvent::ChooseSlot(starts_at))
    }

    /// Runs the submission algorithm. On success the widget closes; on failure the
    /// state is left as it was so the form can be resubmitted.
    pub async fn submit(&mut self, form: &ContactForm) -> Result<SubmissionOutcome, SubmissionError> {
        if !self.is_open {
            return Err(SubmissionError::NotOpen);
        }
        let selection = match (self.state.patient_type, self.state.service) {
            (Some(patient_type), Some(service)) => BookingSelection {
                patient_type,
                service,
                starts_at: self.state.selected_time,
            },
            _ => {
                return Err(SubmissionError::Validation {
                    field: "appointment_time",
                    message: "Please choose an appointment time.".to_string(),
                })
            }
        };

        let outcome = submit_booking(
            self.store.as_ref(),
            self.notifier.as_ref(),
            &self.schedule.phone,
            &selection,
            form,
        )
        .await?;
        self.close();
        Ok(outcome)
    }
}
