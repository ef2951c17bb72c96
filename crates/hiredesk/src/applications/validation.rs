use serde::Serialize;

use super::domain::{
    ApplicationForm, DocumentKind, DocumentUpload, ValidApplication, MAX_DOCUMENT_BYTES,
};

/// One failed field rule, keyed by the field's wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub(crate) const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// All field rules that failed for the attempted step or submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) failed validation", errors.len())]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
}

pub(crate) fn check_documents(form: &ApplicationForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_document(
        &mut errors,
        "usId",
        form.us_id.as_ref(),
        DocumentKind::UsId,
        "US ID is required",
        "File must be JPEG, PNG, or PDF",
    );
    check_document(
        &mut errors,
        "cv",
        form.cv.as_ref(),
        DocumentKind::Cv,
        "CV is required",
        "File must be PDF, DOC, or DOCX",
    );
    errors
}

fn check_document(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    document: Option<&DocumentUpload>,
    kind: DocumentKind,
    missing: &'static str,
    wrong_type: &'static str,
) {
    let Some(document) = document else {
        errors.push(FieldError::new(field, missing));
        return;
    };

    if document.size() > MAX_DOCUMENT_BYTES {
        errors.push(FieldError::new(field, "File size must be less than 5MB"));
    }
    if !kind.accepts(&document.content_type) {
        errors.push(FieldError::new(field, wrong_type));
    }
}

pub(crate) fn check_personal(form: &ApplicationForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !has_min_chars(&form.first_name, 2) {
        errors.push(FieldError::new(
            "firstName",
            "First name must be at least 2 characters",
        ));
    }
    if !has_min_chars(&form.last_name, 2) {
        errors.push(FieldError::new(
            "lastName",
            "Last name must be at least 2 characters",
        ));
    }
    if !is_valid_email(&form.email) {
        errors.push(FieldError::new(
            "email",
            "Please enter a valid email address",
        ));
    }
    if !has_min_chars(&form.phone, 10) {
        errors.push(FieldError::new("phone", "Please enter a valid phone number"));
    }
    if form.date_of_birth.is_none() {
        errors.push(FieldError::new(
            "dateOfBirth",
            "Please select your date of birth",
        ));
    }
    errors
}

pub(crate) fn check_address(form: &ApplicationForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !has_min_chars(&form.address, 5) {
        errors.push(FieldError::new(
            "address",
            "Address must be at least 5 characters",
        ));
    }
    if !has_min_chars(&form.city, 2) {
        errors.push(FieldError::new("city", "City must be at least 2 characters"));
    }
    if !has_min_chars(&form.state, 2) {
        errors.push(FieldError::new(
            "state",
            "State must be at least 2 characters",
        ));
    }
    if !has_min_chars(&form.zip_code, 5) {
        errors.push(FieldError::new(
            "zipCode",
            "Zip code must be at least 5 characters",
        ));
    }
    errors
}

pub(crate) fn check_position(form: &ApplicationForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if form.position.is_none() {
        errors.push(FieldError::new("position", "Please select a position"));
    }
    if form.salary_expectation.is_empty() {
        errors.push(FieldError::new(
            "salaryExpectation",
            "Please provide your salary expectation",
        ));
    }
    if form.start_date.is_none() {
        errors.push(FieldError::new(
            "startDate",
            "Please select your earliest start date",
        ));
    }
    errors
}

pub(crate) fn check_experience(form: &ApplicationForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !has_min_chars(&form.experience, 10) {
        errors.push(FieldError::new(
            "experience",
            "Please provide your relevant experience",
        ));
    }
    if !has_min_chars(&form.education, 10) {
        errors.push(FieldError::new(
            "education",
            "Please provide your educational background",
        ));
    }
    if !has_min_chars(&form.skills, 5) {
        errors.push(FieldError::new("skills", "Please list your relevant skills"));
    }
    // references stay optional with no constraint
    errors
}

/// Run every field rule and, when clean, promote the draft into a
/// [`ValidApplication`] ready for the submission pipeline.
pub fn validate_form(form: &ApplicationForm) -> Result<ValidApplication, ValidationFailure> {
    let mut errors = check_documents(form);
    errors.extend(check_personal(form));
    errors.extend(check_address(form));
    errors.extend(check_position(form));
    errors.extend(check_experience(form));

    if !errors.is_empty() {
        return Err(ValidationFailure { errors });
    }

    // Every Option was already checked by its step rule; a None here means the
    // rule set and this mapping fell out of sync.
    let (Some(date_of_birth), Some(start_date), Some(position), Some(us_id), Some(cv)) = (
        form.date_of_birth,
        form.start_date,
        form.position,
        form.us_id.clone(),
        form.cv.clone(),
    ) else {
        return Err(ValidationFailure {
            errors: vec![FieldError::new("form", "Validation rules are incomplete")],
        });
    };

    Ok(ValidApplication {
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        date_of_birth,
        address: form.address.clone(),
        city: form.city.clone(),
        state: form.state.clone(),
        zip_code: form.zip_code.clone(),
        position,
        employment_type: form.employment_type,
        salary_expectation: form.salary_expectation.clone(),
        start_date,
        experience: form.experience.clone(),
        education: form.education.clone(),
        skills: form.skills.clone(),
        references: form.references.clone(),
        us_id,
        cv,
    })
}

fn has_min_chars(value: &str, minimum: usize) -> bool {
    value.chars().count() >= minimum
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if value.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    domain.contains('.')
}
