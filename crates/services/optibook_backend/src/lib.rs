// File: crates/services/optibook_backend/src/lib.rs
pub mod app_state;
pub mod service_factory;

use app_state::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub const WELCOME_MESSAGE: &str = "Welcome to the Optibook API!";

/// Assembles the full application: every router nested under `/api`.
pub fn build_app(state: &AppState) -> Router {
    let api_router = Router::new()
        .route("/", get(|| async { WELCOME_MESSAGE }))
        .merge(optibook_common::routes())
        .merge(optibook_scheduling::routes::routes(state.scheduling_state()))
        .merge(optibook_notify::routes(state.notify_state()));

    #[allow(unused_mut)] // only mutated with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use optibook_notify::doc::NotifyApiDoc;
        use optibook_scheduling::doc::SchedulingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Optibook API",
                version = "0.1.0",
                description = "Clinic appointment booking API",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(SchedulingApiDoc::openapi());
        openapi_doc.merge(NotifyApiDoc::openapi());
        tracing::info!("Adding Swagger UI at /api/docs");
        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    app.layer(TraceLayer::new_for_http())
}
