//! Booking notifications for Optibook
//!
//! Implementations of [`optibook_common::NotificationService`] (Resend email, a
//! log-only fallback and an HTTP client for the backend endpoint) plus the
//! `send-email` route the booking widget posts to.

pub mod doc;
pub mod email;
pub mod handlers;
pub mod log_only;
pub mod routes;
pub mod service;
pub mod widget_client;

pub use handlers::{EmailStatus, NotifyState, SendEmailRequest};
pub use log_only::LogOnlyNotifier;
pub use routes::routes;
pub use service::ResendNotificationService;
pub use widget_client::HttpBookingNotifier;
