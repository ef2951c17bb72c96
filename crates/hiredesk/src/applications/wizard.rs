use super::domain::{ApplicationForm, DocumentUpload, ValidApplication};
use super::intake::{IntakeError, IntakeService};
use super::repository::{ApplicationRecord, ApplicationStore};
use super::validation::{
    check_address, check_documents, check_experience, check_personal, check_position,
    validate_form, FieldError, ValidationFailure,
};
use crate::storage::DocumentStorage;

/// Ordered screens of the intake wizard. Documents come first so applicants
/// without the required files find out before typing anything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WizardStep {
    #[default]
    Documents,
    Personal,
    Address,
    Position,
    Experience,
}

impl WizardStep {
    pub const SEQUENCE: [WizardStep; 5] = [
        WizardStep::Documents,
        WizardStep::Personal,
        WizardStep::Address,
        WizardStep::Position,
        WizardStep::Experience,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::Documents => "Required Documents",
            WizardStep::Personal => "Personal Information",
            WizardStep::Address => "Address Information",
            WizardStep::Position => "Position Information",
            WizardStep::Experience => "Experience & Qualifications",
        }
    }

    /// 1-based step number shown in the progress header.
    pub const fn number(self) -> usize {
        match self {
            WizardStep::Documents => 1,
            WizardStep::Personal => 2,
            WizardStep::Address => 3,
            WizardStep::Position => 4,
            WizardStep::Experience => 5,
        }
    }

    pub const fn is_final(self) -> bool {
        matches!(self, WizardStep::Experience)
    }

    pub fn next(self) -> Option<WizardStep> {
        WizardStep::SEQUENCE.get(self.number()).copied()
    }

    pub fn previous(self) -> Option<WizardStep> {
        self.number()
            .checked_sub(2)
            .and_then(|index| WizardStep::SEQUENCE.get(index).copied())
    }
}

/// Errors surfaced when a wizard is asked to produce its final submission.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("submission is only available from the final step")]
    NotOnFinalStep,
    #[error(transparent)]
    Invalid(#[from] ValidationFailure),
    /// Generic message on purpose; the underlying cause is logged by the
    /// pipeline, not shown to the applicant.
    #[error("application could not be submitted")]
    Submission(#[source] IntakeError),
}

// Schema fields counted by the progress indicator.
const TRACKED_FIELDS: usize = 19;

/// Multi-step intake form state machine.
///
/// Field edits go through [`IntakeWizard::form_mut`]; step movement goes
/// through [`IntakeWizard::advance`] and [`IntakeWizard::retreat`]. Advancing
/// validates only the current step's fields and refuses to move while any of
/// them fail, keeping entered values on every step intact.
#[derive(Debug, Default, Clone)]
pub struct IntakeWizard {
    form: ApplicationForm,
    step: WizardStep,
    field_errors: Vec<FieldError>,
    id_preview: Option<String>,
    cv_file_name: Option<String>,
}

impl IntakeWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ApplicationForm {
        &mut self.form
    }

    /// Field errors from the most recent failed [`IntakeWizard::advance`].
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// Inline data-URL preview, present once an image US ID is attached.
    pub fn id_preview(&self) -> Option<&str> {
        self.id_preview.as_deref()
    }

    pub fn cv_file_name(&self) -> Option<&str> {
        self.cv_file_name.as_deref()
    }

    /// Attach the US ID document, deriving an inline preview for image types.
    pub fn attach_us_id(&mut self, document: DocumentUpload) {
        self.id_preview = document.is_image().then(|| document.data_url());
        self.form.us_id = Some(document);
    }

    /// Attach the CV document, keeping its filename for display.
    pub fn attach_cv(&mut self, document: DocumentUpload) {
        self.cv_file_name = Some(document.file_name.clone());
        self.form.cv = Some(document);
    }

    /// Validate the current step and move forward when every rule passes.
    ///
    /// On failure the wizard stays put and reports every failing field, not
    /// just the first. Advancing from the final step validates but does not
    /// move; submission is a separate operation.
    pub fn advance(&mut self) -> Result<WizardStep, ValidationFailure> {
        let errors = self.step_errors(self.step);
        if !errors.is_empty() {
            self.field_errors = errors.clone();
            return Err(ValidationFailure { errors });
        }

        self.field_errors.clear();
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Move back one step without validating. On the first step this is a
    /// no-op; values entered anywhere are preserved either way.
    pub fn retreat(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Completion percentage: filled schema fields over the total, rounded.
    pub fn progress(&self) -> u8 {
        let form = &self.form;
        let text_fields = [
            &form.first_name,
            &form.last_name,
            &form.email,
            &form.phone,
            &form.address,
            &form.city,
            &form.state,
            &form.zip_code,
            &form.salary_expectation,
            &form.experience,
            &form.education,
            &form.skills,
            &form.references,
        ];

        let mut filled = text_fields
            .into_iter()
            .filter(|value| !value.is_empty())
            .count();
        filled += usize::from(form.date_of_birth.is_some());
        filled += usize::from(form.start_date.is_some());
        filled += usize::from(form.position.is_some());
        filled += usize::from(form.us_id.is_some());
        filled += usize::from(form.cv.is_some());
        // The employment type always holds a selection.
        filled += 1;

        ((filled as f32 / TRACKED_FIELDS as f32) * 100.0).round() as u8
    }

    /// Re-validate the whole form and produce the submission payload. Only
    /// callable from the final step.
    pub fn finalize(&self) -> Result<ValidApplication, WizardError> {
        if !self.step.is_final() {
            return Err(WizardError::NotOnFinalStep);
        }
        Ok(validate_form(&self.form)?)
    }

    /// Submit from the final step: validate the whole form, run the intake
    /// pipeline, and clear the wizard for the next applicant. On any failure
    /// the wizard stays on the final step with every entered value intact.
    pub fn submit<S, B>(
        &mut self,
        service: &IntakeService<S, B>,
    ) -> Result<ApplicationRecord, WizardError>
    where
        S: ApplicationStore,
        B: DocumentStorage,
    {
        let application = self.finalize()?;
        let record = service
            .submit(application)
            .map_err(WizardError::Submission)?;
        self.reset();
        Ok(record)
    }

    /// Clear all entered data and return to the first step, as after a
    /// successful submission.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn step_errors(&self, step: WizardStep) -> Vec<FieldError> {
        match step {
            WizardStep::Documents => check_documents(&self.form),
            WizardStep::Personal => check_personal(&self.form),
            WizardStep::Address => check_address(&self.form),
            WizardStep::Position => check_position(&self.form),
            WizardStep::Experience => check_experience(&self.form),
        }
    }
}
