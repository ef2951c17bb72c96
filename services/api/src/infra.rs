use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use hiredesk::applications::{
    ApplicationDocument, ApplicationId, ApplicationRecord, ApplicationStatus, ApplicationStore,
    StoreError,
};
use hiredesk::auth::{IdentityError, IdentityProvider, Principal, Role};
use hiredesk::storage::{DocumentStorage, StorageError, StoredDocument};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local application store. Stands in for the managed document
/// database until one is attached; records do not survive a restart.
#[derive(Default)]
pub(crate) struct InMemoryApplicationStore {
    sequence: AtomicU64,
    records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
}

impl ApplicationStore for InMemoryApplicationStore {
    fn create(&self, document: ApplicationDocument) -> Result<ApplicationRecord, StoreError> {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let record = ApplicationRecord {
            id: ApplicationId(format!("app-{next:06}")),
            document,
        };
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<ApplicationRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|a, b| {
            b.document
                .created_at
                .cmp(&a.document.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        record.document.status = status;
        record.document.updated_at = Some(Utc::now());
        Ok(())
    }
}

/// Blob store keeping uploads in process memory, for development and the
/// CLI demo. Anything archived here is reachable at a `memory://` URL that
/// only this process can resolve.
#[derive(Default)]
pub(crate) struct InMemoryDocumentStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryDocumentStorage {
    pub(crate) fn blob_count(&self) -> usize {
        self.blobs.lock().expect("storage mutex poisoned").len()
    }
}

impl DocumentStorage for InMemoryDocumentStorage {
    fn store(
        &self,
        path: &str,
        _content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredDocument, StorageError> {
        let mut guard = self.blobs.lock().expect("storage mutex poisoned");
        guard.insert(path.to_string(), bytes.to_vec());
        Ok(StoredDocument {
            url: format!("memory://{path}"),
            reference: path.to_string(),
        })
    }

    fn remove(&self, reference: &str) -> Result<(), StorageError> {
        let mut guard = self.blobs.lock().expect("storage mutex poisoned");
        guard.remove(reference);
        Ok(())
    }
}

/// Identity directory populated from configuration at startup. Accounts are
/// matched on email and password; anything else reads as a rejection.
#[derive(Default)]
pub(crate) struct SeededDirectory {
    accounts: Mutex<Vec<(String, Principal)>>,
}

impl SeededDirectory {
    pub(crate) fn register(&self, email: &str, password: &str, name: &str, role: Role) {
        let mut guard = self.accounts.lock().expect("directory mutex poisoned");
        let principal = Principal {
            id: format!("usr-{:04}", guard.len() + 1),
            name: name.to_string(),
            email: email.to_string(),
            role,
        };
        guard.push((password.to_string(), principal));
    }
}

impl IdentityProvider for SeededDirectory {
    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Principal>, IdentityError> {
        let guard = self.accounts.lock().expect("directory mutex poisoned");
        Ok(guard
            .iter()
            .find(|(stored, principal)| principal.email == email && stored == password)
            .map(|(_, principal)| principal.clone()))
    }
}
