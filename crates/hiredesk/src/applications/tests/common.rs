use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use crate::applications::domain::{
    ApplicationForm, ApplicationId, ApplicationStatus, DocumentUpload, EmploymentType, Position,
    MAX_DOCUMENT_BYTES,
};
use crate::applications::repository::{
    ApplicationDocument, ApplicationRecord, ApplicationStore, StoreError,
};
use crate::applications::router::{console_router, ConsoleState};
use crate::applications::{ConsoleService, IntakeService};
use crate::auth::{
    AuthService, IdentityError, IdentityProvider, Principal, Role, SessionSigner,
};
use crate::storage::{DocumentStorage, StorageError, StoredDocument};

pub(super) fn png_upload() -> DocumentUpload {
    DocumentUpload {
        file_name: "drivers-license.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
    }
}

pub(super) fn pdf_upload() -> DocumentUpload {
    DocumentUpload {
        file_name: "resume.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        bytes: b"%PDF-1.4 sample resume".to_vec(),
    }
}

pub(super) fn oversized_upload() -> DocumentUpload {
    DocumentUpload {
        file_name: "scan.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        bytes: vec![0; MAX_DOCUMENT_BYTES + 1],
    }
}

pub(super) fn filled_form() -> ApplicationForm {
    ApplicationForm {
        first_name: "Avery".to_string(),
        last_name: "Quinn".to_string(),
        email: "avery.quinn@example.com".to_string(),
        phone: "5155550142".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1992, 4, 11),
        address: "128 Court Ave".to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip_code: "50309".to_string(),
        position: Some(Position::SoftwareEngineer),
        employment_type: EmploymentType::FullTime,
        salary_expectation: "95000".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 9, 1),
        experience: "Seven years of backend platform work.".to_string(),
        education: "BSc in Computer Science, Iowa State.".to_string(),
        skills: "Rust, SQL, Kubernetes".to_string(),
        references: String::new(),
        us_id: Some(png_upload()),
        cv: Some(pdf_upload()),
    }
}

pub(super) fn valid_application() -> crate::applications::ValidApplication {
    crate::applications::validate_form(&filled_form()).expect("sample form validates")
}

pub(super) fn submission_json() -> Value {
    json!({
        "firstName": "Avery",
        "lastName": "Quinn",
        "email": "avery.quinn@example.com",
        "phone": "5155550142",
        "dateOfBirth": "1992-04-11",
        "address": "128 Court Ave",
        "city": "Des Moines",
        "state": "IA",
        "zipCode": "50309",
        "position": "software-engineer",
        "employmentType": "full-time",
        "salaryExpectation": "95000",
        "startDate": "2026-09-01",
        "experience": "Seven years of backend platform work.",
        "education": "BSc in Computer Science, Iowa State.",
        "skills": "Rust, SQL, Kubernetes",
        "references": "",
        "usId": {
            "fileName": "drivers-license.png",
            "contentType": "image/png",
            "data": BASE64.encode(png_upload().bytes),
        },
        "cv": {
            "fileName": "resume.pdf",
            "contentType": "application/pdf",
            "data": BASE64.encode(pdf_upload().bytes),
        },
    })
}

pub(super) fn sample_document(
    email: &str,
    status: ApplicationStatus,
    created_at: DateTime<Utc>,
) -> ApplicationDocument {
    ApplicationDocument {
        first_name: "Avery".to_string(),
        last_name: "Quinn".to_string(),
        email: email.to_string(),
        phone: "5155550142".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1992, 4, 11).expect("valid date"),
        address: "128 Court Ave".to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip_code: "50309".to_string(),
        position: Position::SoftwareEngineer,
        employment_type: EmploymentType::FullTime,
        salary_expectation: "95000".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid date"),
        experience: "Seven years of backend platform work.".to_string(),
        education: "BSc in Computer Science, Iowa State.".to_string(),
        skills: "Rust, SQL, Kubernetes".to_string(),
        references: String::new(),
        us_id_url: "local://ids/sample-id".to_string(),
        cv_url: "local://cvs/sample-cv".to_string(),
        status,
        created_at,
        updated_at: None,
    }
}

pub(super) fn day(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).single().expect("valid instant")
        + Duration::days(offset)
}

#[derive(Default)]
pub(super) struct MemoryStore {
    sequence: AtomicU64,
    records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
}

impl ApplicationStore for MemoryStore {
    fn create(&self, document: ApplicationDocument) -> Result<ApplicationRecord, StoreError> {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let record = ApplicationRecord {
            id: ApplicationId(format!("app-{next:06}")),
            document,
        };
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(record.id.clone(), record.clone());
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

pub(super) struct UnavailableStore;

impl ApplicationStore for UnavailableStore {
    fn create(&self, _document: ApplicationDocument) -> Result<ApplicationRecord, StoreError> {
        Err(StoreError::Unavailable("document store offline".to_string()))
    }

    fn list_all(&self) -> Result<Vec<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("document store offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("document store offline".to_string()))
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("document store offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryStorage {
    stored: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
}

impl MemoryStorage {
    pub(super) fn stored_paths(&self) -> Vec<String> {
        self.stored.lock().expect("storage mutex poisoned").clone()
    }

    pub(super) fn removed_references(&self) -> Vec<String> {
        self.removed.lock().expect("storage mutex poisoned").clone()
    }
}

impl DocumentStorage for MemoryStorage {
    fn store(
        &self,
        path: &str,
        _content_type: &str,
        _bytes: &[u8],
    ) -> Result<StoredDocument, StorageError> {
        self.stored
            .lock()
            .expect("storage mutex poisoned")
            .push(path.to_string());
        Ok(StoredDocument {
            url: format!("local://{path}"),
            reference: path.to_string(),
        })
    }

    fn remove(&self, reference: &str) -> Result<(), StorageError> {
        self.removed
            .lock()
            .expect("storage mutex poisoned")
            .push(reference.to_string());
        Ok(())
    }
}

/// Storage that accepts a fixed number of writes, then fails every later
/// one. Removals still succeed so rollbacks can be observed.
pub(super) struct FlakyStorage {
    inner: MemoryStorage,
    allowed: usize,
    attempts: AtomicUsize,
}

impl FlakyStorage {
    pub(super) fn allowing(allowed: usize) -> Self {
        Self {
            inner: MemoryStorage::default(),
            allowed,
            attempts: AtomicUsize::new(0),
        }
    }

    pub(super) fn stored_paths(&self) -> Vec<String> {
        self.inner.stored_paths()
    }

    pub(super) fn removed_references(&self) -> Vec<String> {
        self.inner.removed_references()
    }
}

impl DocumentStorage for FlakyStorage {
    fn store(
        &self,
        path: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredDocument, StorageError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.allowed {
            return Err(StorageError::Backend("storage degraded".to_string()));
        }
        self.inner.store(path, content_type, bytes)
    }

    fn remove(&self, reference: &str) -> Result<(), StorageError> {
        self.inner.remove(reference)
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    accounts: Mutex<Vec<(String, Principal)>>,
}

impl MemoryDirectory {
    pub(super) fn register(&self, email: &str, password: &str, name: &str, role: Role) {
        let principal = Principal {
            id: format!("usr-{:04}", self.accounts.lock().expect("directory mutex poisoned").len() + 1),
            name: name.to_string(),
            email: email.to_string(),
            role,
        };
        self.accounts
            .lock()
            .expect("directory mutex poisoned")
            .push((password.to_string(), principal));
    }
}

impl IdentityProvider for MemoryDirectory {
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

pub(super) fn build_intake() -> (
    IntakeService<MemoryStore, MemoryStorage>,
    Arc<MemoryStore>,
    Arc<MemoryStorage>,
) {
    let store = Arc::new(MemoryStore::default());
    let storage = Arc::new(MemoryStorage::default());
    let service = IntakeService::new(store.clone(), storage.clone());
    (service, store, storage)
}

pub(super) fn admin_directory() -> Arc<MemoryDirectory> {
    let directory = MemoryDirectory::default();
    directory.register(
        "morgan.reyes@example.com",
        "correct-horse",
        "Morgan Reyes",
        Role::Admin,
    );
    directory.register(
        "jamie.cole@example.com",
        "battery-staple",
        "Jamie Cole",
        Role::Member,
    );
    Arc::new(directory)
}

pub(super) fn auth_service(directory: Arc<MemoryDirectory>) -> Arc<AuthService<MemoryDirectory>> {
    Arc::new(AuthService::new(
        directory,
        SessionSigner::new("a-local-test-secret"),
        Duration::minutes(30),
    ))
}

pub(super) fn admin_token(auth: &AuthService<MemoryDirectory>) -> String {
    auth.login("morgan.reyes@example.com", "correct-horse")
        .expect("admin login succeeds")
        .token
}

pub(super) fn console_router_over(
    store: Arc<MemoryStore>,
) -> (axum::Router, Arc<AuthService<MemoryDirectory>>) {
    let auth = auth_service(admin_directory());
    let state = ConsoleState {
        console: Arc::new(ConsoleService::new(store)),
        auth: auth.clone(),
    };
    (console_router(state), auth)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf8 payload")
}
