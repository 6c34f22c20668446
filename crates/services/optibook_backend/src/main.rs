// File: crates/services/optibook_backend/src/main.rs
use optibook_backend::{app_state::AppState, build_app};
use optibook_common::{init_from_config, log_error, Context, OptibookError};
use optibook_config::{load_config, AppConfig};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

async fn run(config: Arc<AppConfig>) -> Result<(), OptibookError> {
    let state = AppState::new(config.clone()).await?;
    let app = build_app(&state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    // Flushes the log file on drop
    let _log_guard = init_from_config(config.logging.as_ref());

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error(e, "Optibook backend stopped");
            ExitCode::FAILURE
        }
    }
}
