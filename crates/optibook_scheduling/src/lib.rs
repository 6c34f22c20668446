// --- File: crates/optibook_scheduling/src/lib.rs ---
pub mod availability;
pub mod doc;
pub mod flow;
pub mod handlers;
#[cfg(test)]
pub mod mock;
pub mod routes;
pub mod schedule;
pub mod slots;
#[cfg(test)]
mod slots_proptest;
pub mod submission;
#[cfg(test)]
mod submission_test;

pub use flow::{apply, BookingFlow, BookingFlowState, BookingStep, FlowError, FlowEvent};
pub use handlers::SchedulingState;
pub use schedule::ClinicSchedule;
pub use slots::{generate_slot_times, generate_slots, BusinessHours, TimeSlot};
pub use submission::{ContactForm, SubmissionError, SubmissionOutcome};
