use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{ApplicationForm, ApplicationStatus, DocumentKind, ValidApplication};
use super::repository::{ApplicationDocument, ApplicationRecord, ApplicationStore, StoreError};
use super::validation::{validate_form, ValidationFailure};
use crate::storage::{DocumentStorage, StorageError, StoredDocument};

/// Error enumeration for the submission pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Invalid(#[from] ValidationFailure),
    #[error("document upload failed: {0}")]
    Upload(#[from] StorageError),
    #[error("could not persist application: {0}")]
    Store(#[from] StoreError),
}

/// Accepts validated applications: uploads both documents, then persists the
/// record. A failure after an upload removes the blobs already written so the
/// backing stores hold no orphans.
pub struct IntakeService<S, B> {
    store: Arc<S>,
    documents: Arc<B>,
}

impl<S, B> IntakeService<S, B>
where
    S: ApplicationStore,
    B: DocumentStorage,
{
    pub fn new(store: Arc<S>, documents: Arc<B>) -> Self {
        Self { store, documents }
    }

    /// Validate a raw form and submit it in one call.
    pub fn submit_form(&self, form: &ApplicationForm) -> Result<ApplicationRecord, IntakeError> {
        let application = validate_form(form)?;
        self.submit(application)
    }

    /// Upload the US ID, then the CV, then persist. Both storage paths share
    /// one timestamp so a submission's blobs sort together.
    pub fn submit(&self, application: ValidApplication) -> Result<ApplicationRecord, IntakeError> {
        let submitted_at = Utc::now();
        let email = &application.email;

        let id_path = DocumentKind::UsId.storage_path(email, submitted_at);
        let stored_id = self
            .documents
            .store(&id_path, &application.us_id.content_type, &application.us_id.bytes)?;

        let cv_path = DocumentKind::Cv.storage_path(email, submitted_at);
        let stored_cv = match self
            .documents
            .store(&cv_path, &application.cv.content_type, &application.cv.bytes)
        {
            Ok(stored) => stored,
            Err(error) => {
                self.discard(&stored_id);
                return Err(error.into());
            }
        };

        let document = build_document(application, &stored_id, &stored_cv, submitted_at);
        let record = match self.store.create(document) {
            Ok(record) => record,
            Err(error) => {
                self.discard(&stored_id);
                self.discard(&stored_cv);
                return Err(error.into());
            }
        };

        info!(
            application = %record.id.0,
            email = %record.document.email,
            position = record.document.position.slug(),
            "application submitted"
        );
        Ok(record)
    }

    /// Best-effort removal of an uploaded blob during rollback. The
    /// submission already failed; a cleanup failure is logged, not returned.
    fn discard(&self, stored: &StoredDocument) {
        if let Err(error) = self.documents.remove(&stored.reference) {
            warn!(reference = %stored.reference, %error, "failed to remove orphaned document");
        }
    }
}

fn build_document(
    application: ValidApplication,
    stored_id: &StoredDocument,
    stored_cv: &StoredDocument,
    submitted_at: chrono::DateTime<Utc>,
) -> ApplicationDocument {
    ApplicationDocument {
        first_name: application.first_name,
        last_name: application.last_name,
        email: application.email,
        phone: application.phone,
        date_of_birth: application.date_of_birth,
        address: application.address,
        city: application.city,
        state: application.state,
        zip_code: application.zip_code,
        position: application.position,
        employment_type: application.employment_type,
        salary_expectation: application.salary_expectation,
        start_date: application.start_date,
        experience: application.experience,
        education: application.education,
        skills: application.skills,
        references: application.references,
        us_id_url: stored_id.url.clone(),
        cv_url: stored_cv.url.clone(),
        status: ApplicationStatus::New,
        created_at: submitted_at,
        updated_at: None,
    }
}
