use std::sync::Arc;

use super::common::*;

use crate::applications::domain::{ApplicationForm, ApplicationStatus};
use crate::applications::intake::{IntakeError, IntakeService};
use crate::applications::repository::ApplicationStore;

fn shared_millis<'a>(id_path: &'a str, cv_path: &'a str) -> (&'a str, &'a str) {
    let id_millis = id_path
        .trim_start_matches("ids/avery.quinn@example.com-")
        .trim_end_matches("-id");
    let cv_millis = cv_path
        .trim_start_matches("cvs/avery.quinn@example.com-")
        .trim_end_matches("-cv");
    (id_millis, cv_millis)
}

#[test]
fn submit_uploads_both_documents_with_one_timestamp() {
    let (service, _store, storage) = build_intake();

    let record = service.submit(valid_application()).expect("submission succeeds");

    let paths = storage.stored_paths();
    assert_eq!(paths.len(), 2);
    assert!(paths[0].starts_with("ids/avery.quinn@example.com-"));
    assert!(paths[0].ends_with("-id"));
    assert!(paths[1].starts_with("cvs/avery.quinn@example.com-"));
    assert!(paths[1].ends_with("-cv"));

    let (id_millis, cv_millis) = shared_millis(&paths[0], &paths[1]);
    assert_eq!(id_millis, cv_millis);
    assert_eq!(
        record.document.created_at.timestamp_millis().to_string(),
        id_millis
    );
}

#[test]
fn submit_persists_a_new_record_pointing_at_the_blobs() {
    let (service, store, storage) = build_intake();

    let record = service.submit(valid_application()).expect("submission succeeds");

    assert_eq!(record.id.0, "app-000001");
    assert_eq!(record.document.status, ApplicationStatus::New);
    assert_eq!(record.document.updated_at, None);

    let paths = storage.stored_paths();
    assert_eq!(record.document.us_id_url, format!("local://{}", paths[0]));
    assert_eq!(record.document.cv_url, format!("local://{}", paths[1]));

    let stored = store.fetch(&record.id).expect("fetch works").expect("record present");
    assert_eq!(stored, record);
}

#[test]
fn each_submission_gets_the_next_identifier() {
    let (service, _store, _storage) = build_intake();

    let first = service.submit(valid_application()).expect("first succeeds");
    let second = service.submit(valid_application()).expect("second succeeds");

    assert_eq!(first.id.0, "app-000001");
    assert_eq!(second.id.0, "app-000002");
}

#[test]
fn a_failed_cv_upload_removes_the_id_blob() {
    let store = Arc::new(MemoryStore::default());
    let storage = Arc::new(FlakyStorage::allowing(1));
    let service = IntakeService::new(store.clone(), storage.clone());

    let error = service.submit(valid_application()).unwrap_err();
    assert!(matches!(error, IntakeError::Upload(_)));

    let stored = storage.stored_paths();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].starts_with("ids/"));
    assert_eq!(storage.removed_references(), stored);
    assert!(store.list_all().expect("listing works").is_empty());
}

#[test]
fn a_failed_store_write_removes_both_blobs() {
    let storage = Arc::new(MemoryStorage::default());
    let service = IntakeService::new(Arc::new(UnavailableStore), storage.clone());

    let error = service.submit(valid_application()).unwrap_err();
    assert!(matches!(error, IntakeError::Store(_)));

    let stored = storage.stored_paths();
    assert_eq!(stored.len(), 2);
    assert_eq!(storage.removed_references(), stored);
}

#[test]
fn a_failed_first_upload_leaves_nothing_behind() {
    let store = Arc::new(MemoryStore::default());
    let storage = Arc::new(FlakyStorage::allowing(0));
    let service = IntakeService::new(store.clone(), storage.clone());

    let error = service.submit(valid_application()).unwrap_err();
    assert!(matches!(error, IntakeError::Upload(_)));
    assert!(storage.stored_paths().is_empty());
    assert!(storage.removed_references().is_empty());
    assert!(store.list_all().expect("listing works").is_empty());
}

#[test]
fn submit_form_rejects_invalid_input_before_any_upload() {
    let (service, store, storage) = build_intake();

    let error = service.submit_form(&ApplicationForm::default()).unwrap_err();
    let IntakeError::Invalid(failure) = error else {
        panic!("expected a validation failure");
    };
    assert_eq!(failure.errors.len(), 17);
    assert!(storage.stored_paths().is_empty());
    assert!(store.list_all().expect("listing works").is_empty());
}

#[test]
fn an_oversized_document_never_reaches_storage() {
    let (service, _store, storage) = build_intake();

    let mut form = filled_form();
    form.cv = Some(oversized_upload());

    let error = service.submit_form(&form).unwrap_err();
    assert!(matches!(error, IntakeError::Invalid(_)));
    assert!(storage.stored_paths().is_empty());
}

#[test]
fn submit_form_accepts_a_complete_form() {
    let (service, store, _storage) = build_intake();

    let record = service.submit_form(&filled_form()).expect("form submits");
    assert_eq!(record.document.email, "avery.quinn@example.com");
    assert_eq!(store.list_all().expect("listing works").len(), 1);
}
