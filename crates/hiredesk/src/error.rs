use crate::applications::IntakeError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Faults that reach the binary's top level. Everything except `Intake`
/// aborts startup; `Intake` surfaces as a client error.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Intake(IntakeError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "could not load configuration: {err}"),
            AppError::Telemetry(err) => write!(f, "telemetry setup failed: {err}"),
            AppError::Io(err) => write!(f, "i/o failure: {err}"),
            AppError::Server(err) => write!(f, "http server failed: {err}"),
            AppError::Intake(err) => write!(f, "submission pipeline failed: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let source: &(dyn std::error::Error + 'static) = match self {
            AppError::Config(err) => err,
            AppError::Telemetry(err) => err,
            AppError::Io(err) => err,
            AppError::Server(err) => err,
            AppError::Intake(err) => err,
        };
        Some(source)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if matches!(self, AppError::Intake(_)) {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<TelemetryError> for AppError {
    fn from(err: TelemetryError) -> Self {
        Self::Telemetry(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<axum::Error> for AppError {
    fn from(err: axum::Error) -> Self {
        Self::Server(err)
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        Self::Intake(err)
    }
}
