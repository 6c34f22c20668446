// --- File: crates/optibook_notify/src/routes.rs ---
use crate::handlers::{
    email_status_handler, method_not_allowed_handler, preflight_handler, send_email_handler,
    NotifyState,
};
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

/// Creates the router for the `send-email` endpoint and the email status check.
///
/// Every response carries `Access-Control-Allow-Origin: *`.
pub fn routes(state: Arc<NotifyState>) -> Router {
    Router::new()
        .route(
            "/send-email",
            post(send_email_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler),
        )
        .route("/test", get(email_status_handler))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .with_state(state)
}
