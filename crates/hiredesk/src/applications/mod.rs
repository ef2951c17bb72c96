//! Job application intake and review.
//!
//! Candidates work through a five-step wizard ([`wizard::IntakeWizard`]) whose
//! rules live in [`validation`]; a completed form is submitted through
//! [`intake::IntakeService`], which uploads both documents and persists the
//! record. Reviewers query, re-status, and export the stored applications via
//! [`console::ConsoleService`]. HTTP surfaces for both halves are in
//! [`router`].

pub mod console;
pub mod domain;
pub mod intake;
pub mod repository;
pub mod router;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use console::{
    ApplicationRow, ConsoleError, ConsolePage, ConsoleQuery, ConsoleService, SortDirection,
    SortField,
};
pub use domain::{
    ApplicationForm, ApplicationId, ApplicationStatus, DocumentKind, DocumentUpload,
    EmploymentType, Position, ValidApplication, MAX_DOCUMENT_BYTES,
};
pub use intake::{IntakeError, IntakeService};
pub use repository::{ApplicationDocument, ApplicationRecord, ApplicationStore, StoreError};
pub use router::{application_router, console_router, ConsoleState};
pub use validation::{validate_form, FieldError, ValidationFailure};
pub use wizard::{IntakeWizard, WizardError, WizardStep};
