use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{ApplicationId, ApplicationStatus};
use super::repository::{ApplicationRecord, ApplicationStore, StoreError};

/// Column the review console sorts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    SubmittedAt,
    Email,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// One console request: filters, sort order, and the page to return.
#[derive(Debug, Clone)]
pub struct ConsoleQuery {
    pub search: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for ConsoleQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            sort_field: SortField::default(),
            sort_direction: SortDirection::default(),
            page_index: 0,
            page_size: 10,
        }
    }
}

/// One row of the console table, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub id: ApplicationId,
    pub full_name: String,
    pub email: String,
    pub position: String,
    pub status: String,
    pub submitted_on: String,
}

impl ApplicationRow {
    fn from_record(record: &ApplicationRecord) -> Self {
        Self {
            id: record.id.clone(),
            full_name: record.full_name(),
            email: record.document.email.clone(),
            position: record.document.position.title().to_string(),
            status: record.document.status.label().to_string(),
            submitted_on: record.document.created_at.format("%B %-d, %Y").to_string(),
        }
    }
}

/// A page of console rows plus the paging facts the table needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolePage {
    pub rows: Vec<ApplicationRow>,
    pub page_index: usize,
    pub page_count: usize,
    pub total: usize,
}

/// Error enumeration for console operations.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("csv export failed: {0}")]
    Export(String),
}

/// Read and review operations over the application store.
pub struct ConsoleService<S> {
    store: Arc<S>,
}

impl<S> ConsoleService<S>
where
    S: ApplicationStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Filter, sort, and page the stored applications. A `page_index` past
    /// the end yields an empty page with the real counts.
    pub fn list(&self, query: &ConsoleQuery) -> Result<ConsolePage, ConsoleError> {
        let mut records = self.store.list_all()?;
        retain_matching(&mut records, query);
        sort_records(&mut records, query.sort_field, query.sort_direction);

        let total = records.len();
        let page_size = query.page_size.max(1);
        let page_count = total.div_ceil(page_size);
        let rows = records
            .iter()
            .skip(query.page_index.saturating_mul(page_size))
            .take(page_size)
            .map(ApplicationRow::from_record)
            .collect();

        Ok(ConsolePage {
            rows,
            page_index: query.page_index,
            page_count,
            total,
        })
    }

    pub fn detail(&self, id: &ApplicationId) -> Result<ApplicationRecord, ConsoleError> {
        let record = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;
        Ok(record)
    }

    /// Write the new status, then return the record as the store now holds
    /// it. Readers see the store's version, not an optimistic echo.
    pub fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, ConsoleError> {
        self.store.update_status(id, status)?;
        let record = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;
        info!(application = %record.id.0, status = status.label(), "application status updated");
        Ok(record)
    }

    /// Export the full filtered result set as CSV, ignoring pagination.
    pub fn export_csv(&self, query: &ConsoleQuery) -> Result<Vec<u8>, ConsoleError> {
        let mut records = self.store.list_all()?;
        retain_matching(&mut records, query);
        sort_records(&mut records, query.sort_field, query.sort_direction);

        let mut writer = csv::Writer::from_writer(vec![]);
        writer
            .write_record([
                "id",
                "name",
                "email",
                "phone",
                "position",
                "employmentType",
                "status",
                "submitted",
            ])
            .map_err(|error| ConsoleError::Export(error.to_string()))?;
        for record in &records {
            writer
                .write_record([
                    record.id.0.as_str(),
                    &record.full_name(),
                    &record.document.email,
                    &record.document.phone,
                    record.document.position.title(),
                    record.document.employment_type.label(),
                    record.document.status.label(),
                    &record.document.created_at.format("%Y-%m-%d").to_string(),
                ])
                .map_err(|error| ConsoleError::Export(error.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|error| ConsoleError::Export(error.to_string()))
    }
}

/// Keep the records matching the query's search and status filters. The
/// search term matches email substrings case-sensitively.
pub(crate) fn retain_matching(records: &mut Vec<ApplicationRecord>, query: &ConsoleQuery) {
    if let Some(term) = query.search.as_deref() {
        if !term.is_empty() {
            records.retain(|record| record.document.email.contains(term));
        }
    }
    if let Some(status) = query.status {
        records.retain(|record| record.document.status == status);
    }
}

/// Order records for the console. Ties fall back to the id so the order is
/// total and stable across calls.
pub(crate) fn sort_records(
    records: &mut [ApplicationRecord],
    field: SortField,
    direction: SortDirection,
) {
    records.sort_by(|a, b| {
        let ordering = match field {
            SortField::SubmittedAt => a.document.created_at.cmp(&b.document.created_at),
            SortField::Email => a.document.email.cmp(&b.document.email),
        };
        let ordering = match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        match ordering {
            Ordering::Equal => match direction {
                SortDirection::Ascending => a.id.cmp(&b.id),
                SortDirection::Descending => b.id.cmp(&a.id),
            },
            decided => decided,
        }
    });
}
