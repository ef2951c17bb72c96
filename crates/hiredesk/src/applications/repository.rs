use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationStatus, EmploymentType, Position};

/// Fields persisted for one application, before the store assigns an id.
/// Document URLs point at the uploaded blobs; they are never empty once the
/// submission pipeline has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDocument {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub position: Position,
    pub employment_type: EmploymentType,
    pub salary_expectation: String,
    pub start_date: NaiveDate,
    pub experience: String,
    pub education: String,
    pub skills: String,
    pub references: String,
    pub us_id_url: String,
    pub cv_url: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A stored application: the document plus its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    #[serde(flatten)]
    pub document: ApplicationDocument,
}

impl ApplicationRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.document.first_name, self.document.last_name)
    }
}

/// Persistence seam for applications so intake and console logic can be
/// exercised against in-memory stores.
pub trait ApplicationStore: Send + Sync {
    /// Persist a new application. The store assigns the id, which never
    /// changes afterwards.
    fn create(&self, document: ApplicationDocument) -> Result<ApplicationRecord, StoreError>;

    /// Every stored application, newest submission first.
    fn list_all(&self) -> Result<Vec<ApplicationRecord>, StoreError>;

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError>;

    /// Overwrite the status and stamp `updated_at`. No transition rules are
    /// enforced; concurrent writers are last-write-wins.
    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), StoreError>;
}

/// Error enumeration for document store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("application not found")]
    NotFound,
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}
