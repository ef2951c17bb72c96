//! Blob storage for applicant documents.
//!
//! The intake pipeline writes through the [`DocumentStorage`] seam; the
//! production implementation is [`drive::GoogleDriveStorage`]. Direct
//! browser uploads are authorized by the signature endpoint in
//! [`signature`].

pub mod drive;
pub mod signature;

pub use drive::GoogleDriveStorage;
pub use signature::{sign_upload_request, upload_signature_router, UploadSignature};

/// A stored blob: the URL readers follow and the backend reference that
/// deletes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub url: String,
    pub reference: String,
}

/// Blob store seam for uploaded documents.
pub trait DocumentStorage: Send + Sync {
    /// Write a blob at `path` and report where it landed.
    fn store(
        &self,
        path: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredDocument, StorageError>;

    /// Delete a stored blob. Removing a blob that is already gone is not an
    /// error.
    fn remove(&self, reference: &str) -> Result<(), StorageError>;
}

/// Error enumeration for blob store failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("storage runtime unavailable: {0}")]
    Runtime(String),
}
