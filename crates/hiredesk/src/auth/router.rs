use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use super::{AuthError, AuthService, IdentityProvider};

/// Router builder exposing the console login endpoint.
pub fn auth_router<I>(service: Arc<AuthService<I>>) -> Router
where
    I: IdentityProvider + 'static,
{
    Router::new()
        .route("/api/v1/auth/login", post(login_handler::<I>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub(crate) async fn login_handler<I>(
    State(service): State<Arc<AuthService<I>>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    I: IdentityProvider + 'static,
{
    match service.login(&request.email, &request.password) {
        Ok(session) => {
            let payload = json!({
                "token": session.token,
                "name": session.principal.name,
                "email": session.principal.email,
                "expiresAt": session.expires_at,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(AuthError::Denied) => {
            warn!(email = %request.email, "console login denied");
            let payload = json!({
                "error": "access denied",
            });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        }
        Err(other) => {
            error!(error = %other, "console login failed");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
