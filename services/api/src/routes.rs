use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use hiredesk::applications::{
    application_router, console_router, ApplicationStore, ConsoleState, IntakeService,
};
use hiredesk::auth::{auth_router, IdentityProvider};
use hiredesk::config::UploadSignerConfig;
use hiredesk::storage::{upload_signature_router, DocumentStorage};

/// Assemble the full HTTP surface: candidate submission, admin console,
/// console login, upload countersigning, and the operational endpoints.
pub(crate) fn with_application_routes<S, B, I>(
    intake: Arc<IntakeService<S, B>>,
    console: ConsoleState<S, I>,
    uploads: Option<UploadSignerConfig>,
) -> axum::Router
where
    S: ApplicationStore + 'static,
    B: DocumentStorage + 'static,
    I: IdentityProvider + 'static,
{
    let login = auth_router(console.auth.clone());
    application_router(intake)
        .merge(console_router(console))
        .merge(login)
        .merge(upload_signature_router(uploads))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "hiredesk-api" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let report = state.metrics.render();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        report,
    )
}
