use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Largest document accepted from an applicant, in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Catalog of open positions an applicant can choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    SoftwareEngineer,
    SeniorSoftwareEngineer,
    ProductManager,
    UxDesigner,
    DataScientist,
    MarketingSpecialist,
    SalesRepresentative,
    CustomerSupport,
    HrSpecialist,
    FinanceAnalyst,
}

impl Position {
    pub const CATALOG: [Position; 10] = [
        Position::SoftwareEngineer,
        Position::SeniorSoftwareEngineer,
        Position::ProductManager,
        Position::UxDesigner,
        Position::DataScientist,
        Position::MarketingSpecialist,
        Position::SalesRepresentative,
        Position::CustomerSupport,
        Position::HrSpecialist,
        Position::FinanceAnalyst,
    ];

    /// Stable identifier used on the wire and in stored records.
    pub const fn slug(self) -> &'static str {
        match self {
            Position::SoftwareEngineer => "software-engineer",
            Position::SeniorSoftwareEngineer => "senior-software-engineer",
            Position::ProductManager => "product-manager",
            Position::UxDesigner => "ux-designer",
            Position::DataScientist => "data-scientist",
            Position::MarketingSpecialist => "marketing-specialist",
            Position::SalesRepresentative => "sales-representative",
            Position::CustomerSupport => "customer-support",
            Position::HrSpecialist => "hr-specialist",
            Position::FinanceAnalyst => "finance-analyst",
        }
    }

    /// Human-readable title shown in the review console.
    pub const fn title(self) -> &'static str {
        match self {
            Position::SoftwareEngineer => "Software Engineer",
            Position::SeniorSoftwareEngineer => "Senior Software Engineer",
            Position::ProductManager => "Product Manager",
            Position::UxDesigner => "UX Designer",
            Position::DataScientist => "Data Scientist",
            Position::MarketingSpecialist => "Marketing Specialist",
            Position::SalesRepresentative => "Sales Representative",
            Position::CustomerSupport => "Customer Support",
            Position::HrSpecialist => "HR Specialist",
            Position::FinanceAnalyst => "Finance Analyst",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        Position::CATALOG
            .into_iter()
            .find(|position| position.slug() == value)
    }
}

/// Employment arrangement the applicant is applying for. The wizard starts
/// from `FullTime`, so this field always holds a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
}

impl EmploymentType {
    pub const fn label(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full-time",
            EmploymentType::PartTime => "part-time",
            EmploymentType::Contract => "contract",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "full-time" => Some(EmploymentType::FullTime),
            "part-time" => Some(EmploymentType::PartTime),
            "contract" => Some(EmploymentType::Contract),
            _ => None,
        }
    }
}

/// Review status tracked on every stored application. Transitions are
/// unconstrained: any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    New,
    Reviewing,
    Interview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::New,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Interview,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.label() == value)
    }
}

/// The two documents collected during intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    UsId,
    Cv,
}

impl DocumentKind {
    pub const fn folder(self) -> &'static str {
        match self {
            DocumentKind::UsId => "ids",
            DocumentKind::Cv => "cvs",
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            DocumentKind::UsId => "id",
            DocumentKind::Cv => "cv",
        }
    }

    /// Content types accepted for this document slot.
    pub fn accepts(self, content_type: &str) -> bool {
        match self {
            DocumentKind::UsId => {
                matches!(content_type, "image/jpeg" | "image/png" | "application/pdf")
            }
            DocumentKind::Cv => matches!(
                content_type,
                "application/pdf"
                    | "application/msword"
                    | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
        }
    }

    /// Blob path namespaced by applicant email and submission time.
    pub fn storage_path(self, email: &str, at: DateTime<Utc>) -> String {
        format!(
            "{}/{}-{}-{}",
            self.folder(),
            email,
            at.timestamp_millis(),
            self.suffix()
        )
    }
}

/// A file selected by the applicant, held locally until final submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Inline preview representation for image documents.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Draft state edited across the wizard steps. Every field starts empty so the
/// progress indicator can count what has been filled in, except the employment
/// type which always carries a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub position: Option<Position>,
    pub employment_type: EmploymentType,
    pub salary_expectation: String,
    pub start_date: Option<NaiveDate>,
    pub experience: String,
    pub education: String,
    pub skills: String,
    pub references: String,
    pub us_id: Option<DocumentUpload>,
    pub cv: Option<DocumentUpload>,
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            date_of_birth: None,
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            position: None,
            employment_type: EmploymentType::FullTime,
            salary_expectation: String::new(),
            start_date: None,
            experience: String::new(),
            education: String::new(),
            skills: String::new(),
            references: String::new(),
            us_id: None,
            cv: None,
        }
    }
}

/// A fully validated application, produced only by running every field rule.
/// Holds the document payloads still to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidApplication {
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
    pub us_id: DocumentUpload,
    pub cv: DocumentUpload,
}
