use std::io::Cursor;

use google_drive3::{api::File, api::Scope, DriveHub};
use tokio::runtime::Runtime;

use super::{DocumentStorage, StorageError, StoredDocument};

/// Thin wrapper around the generated google-drive3 client allowing the
/// synchronous intake pipeline to upload documents without exposing async
/// details.
pub struct GoogleDriveStorage<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    hub: DriveHub<C>,
    runtime: Runtime,
    parent_folder: Option<String>,
}

impl<C> GoogleDriveStorage<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: DriveHub<C>, runtime: Runtime, parent_folder: Option<String>) -> Self {
        Self {
            hub,
            runtime,
            parent_folder,
        }
    }

    pub fn with_runtime(
        hub: DriveHub<C>,
        parent_folder: Option<String>,
    ) -> Result<Self, StorageError> {
        let runtime = Runtime::new().map_err(|err| StorageError::Runtime(err.to_string()))?;
        Ok(Self::new(hub, runtime, parent_folder))
    }

    fn map_error<E: std::fmt::Display>(err: E) -> StorageError {
        StorageError::Backend(err.to_string())
    }
}

impl<C> std::fmt::Debug for GoogleDriveStorage<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDriveStorage").finish_non_exhaustive()
    }
}

impl<C> DocumentStorage for GoogleDriveStorage<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn store(
        &self,
        path: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredDocument, StorageError> {
        let metadata = File {
            name: Some(path.to_string()),
            parents: self
                .parent_folder
                .as_ref()
                .map(|parent| vec![parent.clone()]),
            ..File::default()
        };

        let media_type = content_type
            .parse::<mime::Mime>()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);
        let cursor = Cursor::new(bytes.to_vec());

        let result = self.runtime.block_on(async {
            self.hub
                .files()
                .create(metadata)
                .param("fields", "id,webViewLink,webContentLink")
                .supports_all_drives(true)
                .add_scope(Scope::File)
                .upload(cursor, media_type)
                .await
        });

        let (_, file) = result.map_err(GoogleDriveStorage::<C>::map_error)?;
        let reference = file.id.unwrap_or_default();
        let url = file
            .web_content_link
            .or(file.web_view_link)
            .unwrap_or_else(|| reference.clone());
        Ok(StoredDocument { url, reference })
    }

    fn remove(&self, reference: &str) -> Result<(), StorageError> {
        let result = self.runtime.block_on(async {
            self.hub
                .files()
                .delete(reference)
                .supports_all_drives(true)
                .add_scope(Scope::File)
                .doit()
                .await
        });

        result.map_err(GoogleDriveStorage::<C>::map_error)?;
        Ok(())
    }
}
