use crate::infra::{InMemoryApplicationStore, InMemoryDocumentStorage, SeededDirectory};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

use hiredesk::applications::{
    ApplicationForm, ApplicationStatus, ConsoleQuery, ConsoleService, DocumentUpload,
    EmploymentType, IntakeService, IntakeWizard, Position, SortDirection, SortField,
};
use hiredesk::auth::{AuthService, Role, SessionSigner};
use hiredesk::config::UploadSignerConfig;
use hiredesk::error::AppError;
use hiredesk::storage::sign_upload_request;

const JPEG_MAGIC: [u8; 4] = [0xff, 0xd8, 0xff, 0xe0];
const SAMPLE_RESUME: &[u8] = b"%PDF-1.7 sample resume for the intake demo";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Number of extra sample applications to seed into the review console.
    #[arg(long)]
    pub(crate) seed: Option<usize>,
    /// Skip the review console portion of the demo.
    #[arg(long)]
    pub(crate) skip_console: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { seed, skip_console } = args;
    let seed = seed.unwrap_or(5);

    println!("HireDesk intake demo");

    let store = Arc::new(InMemoryApplicationStore::default());
    let storage = Arc::new(InMemoryDocumentStorage::default());
    let service = IntakeService::new(store.clone(), storage.clone());
    let console = ConsoleService::new(store);

    println!("\nCandidate wizard walkthrough");
    let mut wizard = IntakeWizard::new();
    print_step(&wizard);

    if let Err(failure) = wizard.advance() {
        println!("  Cannot continue without documents:");
        for error in &failure.errors {
            println!("  - {}: {}", error.field, error.message);
        }
    }

    let us_id = sample_upload("drivers-license.jpg", &JPEG_MAGIC);
    println!(
        "  Attached {} ({}, {} bytes)",
        us_id.file_name,
        us_id.content_type,
        us_id.size()
    );
    wizard.attach_us_id(us_id);
    let cv = sample_upload("jordan-bennett-resume.pdf", SAMPLE_RESUME);
    println!(
        "  Attached {} ({}, {} bytes)",
        cv.file_name,
        cv.content_type,
        cv.size()
    );
    wizard.attach_cv(cv);
    if wizard.id_preview().is_some() {
        println!("  Inline ID preview ready");
    }
    if !advance_or_report(&mut wizard) {
        return Ok(());
    }
    print_step(&wizard);

    let today = Local::now().date_naive();
    {
        let form = wizard.form_mut();
        form.first_name = "Jordan".to_string();
        form.last_name = "Bennett".to_string();
        form.email = "jordan.bennett@example.com".to_string();
        form.phone = "5155550117".to_string();
        form.date_of_birth = Some(today - chrono::Duration::days(12_000));
    }
    if !advance_or_report(&mut wizard) {
        return Ok(());
    }
    print_step(&wizard);

    {
        let form = wizard.form_mut();
        form.address = "900 Grand Ave".to_string();
        form.city = "Des Moines".to_string();
        form.state = "IA".to_string();
        form.zip_code = "50309".to_string();
    }
    if !advance_or_report(&mut wizard) {
        return Ok(());
    }
    print_step(&wizard);

    {
        let form = wizard.form_mut();
        form.position = Some(Position::SoftwareEngineer);
        form.employment_type = EmploymentType::FullTime;
        form.salary_expectation = "98000".to_string();
        form.start_date = Some(today + chrono::Duration::days(30));
    }
    if !advance_or_report(&mut wizard) {
        return Ok(());
    }
    print_step(&wizard);

    {
        let form = wizard.form_mut();
        form.experience = "Six years of backend and platform work.".to_string();
        form.education = "BSc in Computer Science, Iowa State.".to_string();
        form.skills = "Rust, PostgreSQL, Kubernetes".to_string();
        form.references = "Available on request.".to_string();
    }
    println!("  Progress: {}%", wizard.progress());

    let record = match wizard.submit(&service) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };

    println!(
        "\n- Application {} stored for {} ({})",
        record.id.0,
        record.full_name(),
        record.document.email
    );
    println!("- US ID archived at {}", record.document.us_id_url);
    println!("- CV archived at {}", record.document.cv_url);
    println!(
        "- {} document blob(s) held in process memory",
        storage.blob_count()
    );
    println!(
        "- Wizard cleared back to step {} for the next applicant",
        wizard.step().number()
    );

    println!("\nDirect upload countersigning");
    let signer = UploadSignerConfig {
        cloud_name: "demo-cloud".to_string(),
        api_key: "000000000".to_string(),
        api_secret: "demo-secret".to_string(),
    };
    let signed = sign_upload_request(&signer, "cvs", Local::now().timestamp());
    println!(
        "- folder=cvs -> signature {} (timestamp {})",
        signed.signature, signed.timestamp
    );

    if seed > 0 {
        println!("\nSeeding {} more sample application(s)", seed);
        let statuses = [
            None,
            Some(ApplicationStatus::Reviewing),
            Some(ApplicationStatus::Interview),
            Some(ApplicationStatus::Accepted),
            Some(ApplicationStatus::Rejected),
        ];
        for index in 0..seed {
            let form = seeded_form(index, today);
            match service.submit_form(&form) {
                Ok(seeded) => {
                    if let Some(status) = statuses[index % statuses.len()] {
                        if let Err(err) = console.update_status(&seeded.id, status) {
                            println!("  Could not set status for {}: {err}", seeded.id.0);
                        }
                    }
                }
                Err(err) => println!("  Sample application rejected: {err}"),
            }
        }
    }

    if skip_console {
        return Ok(());
    }

    println!("\nReview console demo");
    let directory = Arc::new(SeededDirectory::default());
    directory.register("admin@hiredesk.dev", "walkthrough-only", "Demo Admin", Role::Admin);
    let auth = AuthService::new(
        directory,
        SessionSigner::new("demo-session-secret"),
        chrono::Duration::minutes(60),
    );
    match auth.login("admin@hiredesk.dev", "walkthrough-only") {
        Ok(session) => {
            println!(
                "- Console session issued for {} (expires {})",
                session.principal.email, session.expires_at
            );
            match auth.authorize(&session.token) {
                Ok(principal) => println!(
                    "- Bearer token verifies as {} [{}]",
                    principal.name,
                    principal.role.label()
                ),
                Err(err) => println!("- Token verification failed: {err}"),
            }
        }
        Err(err) => println!("- Login demo unavailable: {err}"),
    }

    let page = match console.list(&ConsoleQuery::default()) {
        Ok(page) => page,
        Err(err) => {
            println!("- Console unavailable: {err}");
            return Ok(());
        }
    };
    println!(
        "- {} application(s) on file across {} page(s)",
        page.total, page.page_count
    );
    for row in &page.rows {
        println!(
            "  - {} | {} | {} | {} | {} | submitted {}",
            row.id.0, row.full_name, row.email, row.position, row.status, row.submitted_on
        );
    }

    match console.list(&ConsoleQuery {
        search: Some("jordan".to_string()),
        ..ConsoleQuery::default()
    }) {
        Ok(filtered) => println!("- Search \"jordan\" matches {} application(s)", filtered.total),
        Err(err) => println!("- Search unavailable: {err}"),
    }

    match console.list(&ConsoleQuery {
        sort_field: SortField::Email,
        sort_direction: SortDirection::Ascending,
        ..ConsoleQuery::default()
    }) {
        Ok(by_email) => println!(
            "- First by email ascending: {}",
            by_email
                .rows
                .first()
                .map(|row| row.email.as_str())
                .unwrap_or("none")
        ),
        Err(err) => println!("- Sorted listing unavailable: {err}"),
    }

    if let Some(row) = page.rows.first() {
        match console.detail(&row.id) {
            Ok(detail) => println!(
                "- Detail {}: {} <{}>, {} ({}), applied {}",
                detail.id.0,
                detail.full_name(),
                detail.document.email,
                detail.document.position.title(),
                detail.document.employment_type.label(),
                detail.document.created_at.format("%B %-d, %Y")
            ),
            Err(err) => println!("- Detail unavailable: {err}"),
        }
        match console.update_status(&row.id, ApplicationStatus::Interview) {
            Ok(updated) => println!(
                "- Moved {} to status {}",
                updated.id.0,
                updated.document.status.label()
            ),
            Err(err) => println!("- Status update failed: {err}"),
        }
    }

    match console.export_csv(&ConsoleQuery::default()) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => {
                println!("\nCSV export (first rows)");
                for line in text.lines().take(8) {
                    println!("  {line}");
                }
            }
            Err(err) => println!("- Export is not valid UTF-8: {err}"),
        },
        Err(err) => println!("- Export failed: {err}"),
    }

    Ok(())
}

fn print_step(wizard: &IntakeWizard) {
    let step = wizard.step();
    println!("\nStep {}/5: {}", step.number(), step.label());
}

fn advance_or_report(wizard: &mut IntakeWizard) -> bool {
    match wizard.advance() {
        Ok(_) => {
            println!("  Progress: {}%", wizard.progress());
            true
        }
        Err(failure) => {
            println!("  Step incomplete:");
            for error in &failure.errors {
                println!("  - {}: {}", error.field, error.message);
            }
            false
        }
    }
}

/// Derive the content type from the file name, as a browser upload would.
fn sample_upload(file_name: &str, bytes: &[u8]) -> DocumentUpload {
    let content_type = mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    DocumentUpload {
        file_name: file_name.to_string(),
        content_type,
        bytes: bytes.to_vec(),
    }
}

fn seeded_form(index: usize, today: NaiveDate) -> ApplicationForm {
    const NAMES: [(&str, &str); 6] = [
        ("Maya", "Chen"),
        ("Liam", "Brody"),
        ("Sofia", "Marquez"),
        ("Noah", "Kim"),
        ("Isla", "Fraser"),
        ("Ethan", "Park"),
    ];
    let (first, last) = NAMES[index % NAMES.len()];
    let position = Position::CATALOG[index % Position::CATALOG.len()];
    let employment = [
        EmploymentType::FullTime,
        EmploymentType::PartTime,
        EmploymentType::Contract,
    ][index % 3];

    ApplicationForm {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!(
            "{}.{}{:02}@example.com",
            first.to_lowercase(),
            last.to_lowercase(),
            index
        ),
        phone: format!("51555501{index:02}"),
        date_of_birth: Some(today - chrono::Duration::days(9_000 + index as i64 * 400)),
        address: format!("{} Grand Ave", 200 + index),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip_code: "50309".to_string(),
        position: Some(position),
        employment_type: employment,
        salary_expectation: (70_000 + index * 5_000).to_string(),
        start_date: Some(today + chrono::Duration::days(21 + index as i64)),
        experience: format!("{} years shipping production systems.", 3 + index),
        education: "BSc in Computer Science.".to_string(),
        skills: "Rust, SQL, Docker".to_string(),
        references: String::new(),
        us_id: Some(sample_upload("drivers-license.jpg", &JPEG_MAGIC)),
        cv: Some(sample_upload("resume.pdf", SAMPLE_RESUME)),
    }
}
