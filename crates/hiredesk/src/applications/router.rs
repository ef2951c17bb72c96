use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::auth::{AuthService, IdentityProvider, Principal};
use crate::storage::DocumentStorage;

use super::console::{ConsoleError, ConsoleQuery, ConsoleService, SortDirection, SortField};
use super::domain::{
    ApplicationForm, ApplicationId, ApplicationStatus, DocumentUpload, EmploymentType, Position,
};
use super::intake::IntakeService;
use super::repository::{ApplicationStore, StoreError};
use super::validation::{validate_form, FieldError};

/// Router builder exposing the public submission endpoint.
pub fn application_router<S, B>(service: Arc<IntakeService<S, B>>) -> Router
where
    S: ApplicationStore + 'static,
    B: DocumentStorage + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<S, B>))
        .with_state(service)
}

/// One uploaded file on the wire: metadata plus base64-encoded content.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub file_name: String,
    pub content_type: String,
    pub data: String,
}

/// Submission body. Field names mirror the wizard's form fields; anything
/// missing deserializes to its empty value so validation can report it.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub position: Option<String>,
    pub employment_type: Option<String>,
    pub salary_expectation: String,
    pub start_date: Option<String>,
    pub experience: String,
    pub education: String,
    pub skills: String,
    pub references: String,
    pub us_id: Option<DocumentPayload>,
    pub cv: Option<DocumentPayload>,
}

impl SubmissionRequest {
    /// Map the wire shape onto a form. Values that fail to parse become
    /// their empty form value, so the field turns up in validation output;
    /// payload-level problems are reported alongside.
    pub(crate) fn into_form(self) -> (ApplicationForm, Vec<FieldError>) {
        let mut wire_errors = Vec::new();

        let employment_type = match self.employment_type.as_deref() {
            None => EmploymentType::default(),
            Some(label) => match EmploymentType::from_label(label) {
                Some(choice) => choice,
                None => {
                    wire_errors.push(FieldError::new(
                        "employmentType",
                        "Please select employment type",
                    ));
                    EmploymentType::default()
                }
            },
        };

        let us_id = self.us_id.and_then(|payload| {
            decode_payload(payload).or_else(|| {
                wire_errors.push(FieldError::new(
                    "usId",
                    "US ID file data must be valid base64",
                ));
                None
            })
        });
        let cv = self.cv.and_then(|payload| {
            decode_payload(payload).or_else(|| {
                wire_errors.push(FieldError::new("cv", "CV file data must be valid base64"));
                None
            })
        });

        let form = ApplicationForm {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            date_of_birth: self.date_of_birth.as_deref().and_then(parse_wire_date),
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            position: self.position.as_deref().and_then(Position::from_slug),
            employment_type,
            salary_expectation: self.salary_expectation,
            start_date: self.start_date.as_deref().and_then(parse_wire_date),
            experience: self.experience,
            education: self.education,
            skills: self.skills,
            references: self.references,
            us_id,
            cv,
        };
        (form, wire_errors)
    }
}

fn parse_wire_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn decode_payload(payload: DocumentPayload) -> Option<DocumentUpload> {
    let bytes = BASE64.decode(payload.data.as_bytes()).ok()?;
    Some(DocumentUpload {
        file_name: payload.file_name,
        content_type: payload.content_type,
        bytes,
    })
}

/// First error per field wins, payload problems ahead of rule failures.
fn merge_field_errors(wire: Vec<FieldError>, validation: Vec<FieldError>) -> Vec<FieldError> {
    let mut merged: Vec<FieldError> = Vec::new();
    for error in wire.into_iter().chain(validation) {
        if !merged.iter().any(|existing| existing.field == error.field) {
            merged.push(error);
        }
    }
    merged
}

fn validation_failed(errors: Vec<FieldError>) -> Response {
    let payload = json!({
        "success": false,
        "message": "Validation failed",
        "errors": errors,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_handler<S, B>(
    State(service): State<Arc<IntakeService<S, B>>>,
    axum::Json(request): axum::Json<SubmissionRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    B: DocumentStorage + 'static,
{
    let (form, wire_errors) = request.into_form();
    let application = match validate_form(&form) {
        Ok(application) if wire_errors.is_empty() => application,
        Ok(_) => return validation_failed(wire_errors),
        Err(failure) => return validation_failed(merge_field_errors(wire_errors, failure.errors)),
    };

    match service.submit(application) {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "message": "Application submitted successfully",
                "id": record.id.0,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => {
            error!(%error, "application submission failed");
            let payload = json!({
                "success": false,
                "message": "Failed to process application",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

/// Shared state for the review console endpoints.
pub struct ConsoleState<S, I> {
    pub console: Arc<ConsoleService<S>>,
    pub auth: Arc<AuthService<I>>,
}

impl<S, I> Clone for ConsoleState<S, I> {
    fn clone(&self) -> Self {
        Self {
            console: Arc::clone(&self.console),
            auth: Arc::clone(&self.auth),
        }
    }
}

/// Router builder exposing the admin review console. Every endpoint requires
/// an admin bearer token.
pub fn console_router<S, I>(state: ConsoleState<S, I>) -> Router
where
    S: ApplicationStore + 'static,
    I: IdentityProvider + 'static,
{
    Router::new()
        .route("/api/v1/admin/applications", get(list_handler::<S, I>))
        .route(
            "/api/v1/admin/applications/export",
            get(export_handler::<S, I>),
        )
        .route(
            "/api/v1/admin/applications/:application_id",
            get(detail_handler::<S, I>),
        )
        .route(
            "/api/v1/admin/applications/:application_id/status",
            put(status_update_handler::<S, I>),
        )
        .with_state(state)
}

/// Query string accepted by the console list and export endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConsoleListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<usize>,
}

impl ConsoleListParams {
    fn into_query(self) -> Result<ConsoleQuery, &'static str> {
        let status = match self.status.as_deref() {
            None | Some("all") => None,
            Some(label) => Some(
                ApplicationStatus::from_label(label).ok_or("unknown status filter")?,
            ),
        };
        let sort_field = match self.sort.as_deref() {
            None => SortField::default(),
            Some("submitted_at") => SortField::SubmittedAt,
            Some("email") => SortField::Email,
            Some(_) => return Err("unknown sort field"),
        };
        let sort_direction = match self.direction.as_deref() {
            None => SortDirection::default(),
            Some("ascending") => SortDirection::Ascending,
            Some("descending") => SortDirection::Descending,
            Some(_) => return Err("unknown sort direction"),
        };
        Ok(ConsoleQuery {
            search: self.search.filter(|term| !term.is_empty()),
            status,
            sort_field,
            sort_direction,
            page_index: self.page.unwrap_or(0),
            ..ConsoleQuery::default()
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

pub(crate) async fn list_handler<S, I>(
    State(state): State<ConsoleState<S, I>>,
    headers: HeaderMap,
    Query(params): Query<ConsoleListParams>,
) -> Response
where
    S: ApplicationStore + 'static,
    I: IdentityProvider + 'static,
{
    if let Err(response) = require_admin(&state.auth, &headers) {
        return response;
    }
    let query = match params.into_query() {
        Ok(query) => query,
        Err(message) => return invalid_query(message),
    };
    match state.console.list(&query) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(error) => console_failure(error),
    }
}

pub(crate) async fn export_handler<S, I>(
    State(state): State<ConsoleState<S, I>>,
    headers: HeaderMap,
    Query(params): Query<ConsoleListParams>,
) -> Response
where
    S: ApplicationStore + 'static,
    I: IdentityProvider + 'static,
{
    if let Err(response) = require_admin(&state.auth, &headers) {
        return response;
    }
    let query = match params.into_query() {
        Ok(query) => query,
        Err(message) => return invalid_query(message),
    };
    match state.console.export_csv(&query) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime::TEXT_CSV.as_ref()),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"applications.csv\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(error) => console_failure(error),
    }
}

pub(crate) async fn detail_handler<S, I>(
    State(state): State<ConsoleState<S, I>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    I: IdentityProvider + 'static,
{
    if let Err(response) = require_admin(&state.auth, &headers) {
        return response;
    }
    let id = ApplicationId(application_id);
    match state.console.detail(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => console_failure(error),
    }
}

pub(crate) async fn status_update_handler<S, I>(
    State(state): State<ConsoleState<S, I>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    I: IdentityProvider + 'static,
{
    if let Err(response) = require_admin(&state.auth, &headers) {
        return response;
    }
    let Some(status) = ApplicationStatus::from_label(&request.status) else {
        return invalid_query("unknown status");
    };
    let id = ApplicationId(application_id);
    match state.console.update_status(&id, status) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => console_failure(error),
    }
}

fn require_admin<I>(auth: &AuthService<I>, headers: &HeaderMap) -> Result<Principal, Response>
where
    I: IdentityProvider,
{
    let Some(token) = bearer_token(headers) else {
        return Err(access_denied());
    };
    auth.authorize(token).map_err(|_| access_denied())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn access_denied() -> Response {
    let payload = json!({
        "error": "access denied",
    });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn invalid_query(message: &str) -> Response {
    let payload = json!({
        "error": message,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

fn console_failure(error: ConsoleError) -> Response {
    match error {
        ConsoleError::Store(StoreError::NotFound) => {
            let payload = json!({
                "error": "application not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        other => {
            error!(error = %other, "console request failed");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
