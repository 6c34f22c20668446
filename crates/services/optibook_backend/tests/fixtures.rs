//! Shared setup for the backend integration tests.
#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use optibook_backend::{app_state::AppState, build_app};
use optibook_config::AppConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Starts the full application on an ephemeral port.
pub async fn spawn_server(config: AppConfig) -> TestServer {
    let state = AppState::new(Arc::new(config)).await.unwrap();
    let app = build_app(&state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    TestServer { addr, state }
}

/// Default clinic, in-memory store, no email provider.
pub fn demo_config() -> AppConfig {
    AppConfig::with_server("127.0.0.1", 0)
}

/// A weekday one to two weeks out, inside the booking horizon.
pub fn upcoming_weekday(today: NaiveDate) -> NaiveDate {
    let mut day = today + Duration::days(7);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day += Duration::days(1);
    }
    day
}
