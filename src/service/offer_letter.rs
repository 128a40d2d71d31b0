use crate::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::offer_letter::{OfferLetter, OfferLetterFields, OfferLetterMeta};
use crate::models::user::{Role, User};
use crate::service::auth::AuthService;
use crate::service::email::EmailService;
use crate::service::password_policy;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use tracing::{info, warn};
use uuid::Uuid;

const COMPANY_NAME: &str = "Acentrik Technology Solutions LLC";
const COMPANY_TAGLINE: &str = "Passion, Innovation & Trust";
const COMPANY_ADDRESS: &str = "4425 W Airport Fwy, Suite 117, Irving, TX 75062";
const DATE_FORMAT: &str = "%b-%d-%Y";

// A4 page, 20mm margins, 11pt body text.
const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 20.0;
const BODY_SIZE: f64 = 11.0;
const LINE_HEIGHT: f64 = 6.0;
const WRAP_COLUMNS: usize = 92;

/// Result of generating a letter: the rendered bytes plus whatever account
/// bookkeeping succeeded. `user` is `None` when recipient provisioning
/// failed; the PDF is still returned, it just is not filed anywhere.
#[derive(Debug)]
pub struct IssuedLetter {
    pub file_name: String,
    pub pdf: Vec<u8>,
    pub user: Option<User>,
    pub generated_password: Option<String>,
}

pub struct OfferLetterService<'a> {
    pub repo: &'a PostgresRepository,
    pub config: &'a Config,
}

impl<'a> OfferLetterService<'a> {
    pub fn new(repo: &'a PostgresRepository, config: &'a Config) -> Self {
        Self { repo, config }
    }

    /// Generate a letter for download: render first (a render failure aborts
    /// before any side effect), then resolve or provision the recipient
    /// account, then file the letter under it.
    pub async fn issue(&self, fields: &OfferLetterFields) -> Result<IssuedLetter, AppError> {
        let pdf = render_pdf(fields)?;
        let file_name = download_file_name(fields);

        let (user, generated_password) = self.provision_recipient(&fields.email).await;

        if let Some(ref user) = user {
            self.repo.save_offer_letter(&user.id, &file_name, &pdf).await?;
            info!(recipient = %fields.email, "offer letter filed for recipient");
        }

        Ok(IssuedLetter {
            file_name,
            pdf,
            user,
            generated_password,
        })
    }

    /// Generate a letter and email it to the recipient. The letter is
    /// persisted before the send, so a delivery failure never rolls back a
    /// stored document. Credentials are embedded in the body only when a
    /// fresh account was provisioned by this call.
    pub async fn email_deliver(&self, fields: &OfferLetterFields, email: &EmailService) -> Result<IssuedLetter, AppError> {
        let pdf = render_pdf(fields)?;
        let file_name = email_file_name(fields);

        let (user, generated_password) = self.provision_recipient(&fields.email).await;

        if let Some(ref user) = user {
            self.repo.save_offer_letter(&user.id, &file_name, &pdf).await?;
        }

        let mut body = build_email_body(fields);
        if let Some(ref password) = generated_password {
            body.push_str(&credentials_section(&fields.email, password));
        }

        let subject = format!("Your Internship Offer from {}", COMPANY_NAME);
        email.send_offer_letter(&fields.email, &subject, &body, pdf.clone(), &file_name).await?;

        info!(recipient = %fields.email, new_account = generated_password.is_some(), "offer letter emailed");

        Ok(IssuedLetter {
            file_name,
            pdf,
            user,
            generated_password,
        })
    }

    pub async fn latest_for(&self, user_id: &Uuid) -> Result<Option<OfferLetter>, AppError> {
        self.repo.get_latest_offer_letter_for_user(user_id).await
    }

    pub async fn all_for(&self, user_id: &Uuid) -> Result<Vec<OfferLetterMeta>, AppError> {
        self.repo.get_offer_letters_for_user(user_id).await
    }

    pub async fn by_id(&self, id: &Uuid) -> Result<Option<OfferLetter>, AppError> {
        self.repo.get_offer_letter_by_id(id).await
    }

    pub async fn remove_by_id(&self, id: &Uuid) -> Result<bool, AppError> {
        self.repo.delete_offer_letter(id).await
    }

    /// Reuse the recipient's account or provision a fresh USER-role one with
    /// a generated password. Provisioning problems are logged and swallowed:
    /// the letter was already rendered and the caller still gets it.
    async fn provision_recipient(&self, email: &str) -> (Option<User>, Option<String>) {
        match self.repo.get_user_by_username(email).await {
            Ok(Some(user)) => (Some(user), None),
            Ok(None) => {
                let auth = AuthService::new(self.repo, self.config);
                let password = password_policy::generate_random_password();
                match auth.register_user(email, &password, Role::User).await {
                    Ok(user) => (Some(user), Some(password)),
                    Err(e) => {
                        warn!(recipient = %email, error = %e, "failed to provision recipient account");
                        (None, None)
                    }
                }
            }
            Err(e) => {
                warn!(recipient = %email, error = %e, "failed to look up recipient account");
                (None, None)
            }
        }
    }
}

pub fn download_file_name(fields: &OfferLetterFields) -> String {
    format!("{}{}.pdf", fields.first_name, fields.last_name)
}

pub fn email_file_name(fields: &OfferLetterFields) -> String {
    format!("{}{}_OfferLetter.pdf", fields.first_name, fields.last_name)
}

pub fn build_email_body(fields: &OfferLetterFields) -> String {
    format!(
        "Dear {},\n\n\
         We are pleased to offer you the {} position at {}. \
         Your internship will begin on {}.\n\n\
         Please find attached your official offer letter with all the details.\n\n\
         If you have any questions, please don't hesitate to contact us.\n\n\
         Best regards,\n\
         HR Director\n\
         {}",
        fields.full_name(),
        fields.role,
        COMPANY_NAME,
        fields.start_date.format(DATE_FORMAT),
        COMPANY_NAME,
    )
}

fn credentials_section(username: &str, password: &str) -> String {
    format!(
        "\n\n----- YOUR LOGIN CREDENTIALS -----\n\
         Username: {}\n\
         Password: {}\n\
         Please log in at our portal to view your profile and offer letter.\n",
        username, password
    )
}

/// Render the letter. Pure function of the fields; failures map to
/// `RenderFailure` before any account or document state is touched.
pub fn render_pdf(fields: &OfferLetterFields) -> Result<Vec<u8>, AppError> {
    let (doc, page, layer) = PdfDocument::new("Offer Letter", Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::TimesRoman).map_err(|e| AppError::render(e.to_string()))?;
    let bold = doc.add_builtin_font(BuiltinFont::TimesBold).map_err(|e| AppError::render(e.to_string()))?;

    let layer = doc.get_page(page).get_layer(layer);
    let mut writer = LetterWriter::new(layer);

    // Letterhead
    writer.centered(COMPANY_NAME, 16.0, &bold);
    writer.centered(COMPANY_TAGLINE, 12.0, &bold);
    writer.blank();

    writer.line(&chrono::Utc::now().date_naive().format(DATE_FORMAT).to_string(), &regular);
    writer.blank();

    writer.bold_line("Offer of Internship", &bold);
    writer.blank();

    writer.line(&format!("Dear {},", fields.full_name()), &regular);
    writer.blank();

    writer.paragraph(
        &format!(
            "It's my pleasure to offer you a {} role at {}. Your internship will be from {}.",
            fields.role,
            COMPANY_NAME,
            fields.start_date.format(DATE_FORMAT)
        ),
        &regular,
    );
    writer.blank();

    writer.paragraph(
        &format!(
            "On behalf of {}, {}, we are pleased to welcome you. You will report to {} (Reporting Manager) during your internship period with us.",
            COMPANY_NAME, COMPANY_ADDRESS, fields.manager
        ),
        &regular,
    );
    writer.blank();

    writer.bold_line("Your job responsibilities include:", &bold);
    for duty in [
        "Conduct business process analysis to understand existing workflows and document current processes and systems.",
        "Create requirements for new processes, develop use cases and manage requirement changes.",
        "Gather, summarize, and verify information used to populate reports and deliverables.",
        "Facilitate requirement reviews with stakeholders, perform QA testing and conduct UAT with business teams.",
    ] {
        writer.paragraph(&format!("  - {}", duty), &regular);
    }
    writer.blank();

    writer.bold_line("At-Will Employment:", &bold);
    writer.paragraph(
        "If you accept this offer, you understand and agree that your employment with the company is for no specified period \
         and constitutes at-will employment. You will be free to resign at any time, and the company will similarly have the \
         right to end its employment relationship with you at any time, with or without notice and with or without cause.",
        &regular,
    );
    writer.blank();

    writer.paragraph(
        "If you have any questions or need further information, please contact the HR team. We look forward to seeing you and we offer you a very warm welcome.",
        &regular,
    );
    writer.blank();

    writer.line("Sincerely,", &regular);
    writer.blank();
    writer.line("HR Director", &regular);
    writer.line(COMPANY_NAME, &regular);

    doc.save_to_bytes().map_err(|e| AppError::render(e.to_string()))
}

/// Cursor-style text placement: tracks the current baseline and wraps long
/// paragraphs at word boundaries.
struct LetterWriter {
    layer: PdfLayerReference,
    y: f64,
}

impl LetterWriter {
    fn new(layer: PdfLayerReference) -> Self {
        Self {
            layer,
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn advance(&mut self, amount: f64) {
        self.y -= amount;
    }

    fn line(&mut self, text: &str, font: &IndirectFontRef) {
        self.layer.use_text(text, BODY_SIZE as f32, Mm(MARGIN as f32), Mm(self.y as f32), font);
        self.advance(LINE_HEIGHT);
    }

    fn bold_line(&mut self, text: &str, bold: &IndirectFontRef) {
        self.layer.use_text(text, BODY_SIZE as f32, Mm(MARGIN as f32), Mm(self.y as f32), bold);
        self.advance(LINE_HEIGHT);
    }

    fn centered(&mut self, text: &str, size: f64, font: &IndirectFontRef) {
        // Rough centering for the builtin face: ~0.48 * size/12 mm per char.
        let approx_width = text.chars().count() as f64 * 0.48 * (size / 12.0) * 4.2;
        let x = ((PAGE_WIDTH - approx_width) / 2.0).max(MARGIN);
        self.layer.use_text(text, size as f32, Mm(x as f32), Mm(self.y as f32), font);
        self.advance(LINE_HEIGHT + 2.0);
    }

    fn paragraph(&mut self, text: &str, font: &IndirectFontRef) {
        for line in wrap_text(text, WRAP_COLUMNS) {
            self.line(&line, font);
        }
    }

    fn blank(&mut self) {
        self.advance(LINE_HEIGHT / 2.0);
    }
}

/// Greedy word wrap; words longer than the column limit get a line of their
/// own rather than being split.
fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= columns {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::offer_fields;

    #[test]
    fn rendered_letter_is_a_pdf() {
        let pdf = render_pdf(&offer_fields()).expect("render must succeed");
        assert!(pdf.starts_with(b"%PDF"), "output must carry the PDF magic bytes");
        assert!(pdf.len() > 500);
    }

    #[test]
    fn file_names_follow_the_recipient() {
        let fields = offer_fields();
        assert_eq!(download_file_name(&fields), "JaneDoe.pdf");
        assert_eq!(email_file_name(&fields), "JaneDoe_OfferLetter.pdf");
    }

    #[test]
    fn email_body_mentions_role_and_start_date() {
        let body = build_email_body(&offer_fields());
        assert!(body.contains("Jane Doe"));
        assert!(body.contains("Business Analyst Intern"));
        assert!(body.contains("Sep-01-2026"));
        assert!(!body.contains("LOGIN CREDENTIALS"));
    }

    #[test]
    fn credentials_section_carries_username_and_password() {
        let section = credentials_section("jane.doe@example.com", "S3cret!Pw");
        assert!(section.contains("jane.doe@example.com"));
        assert!(section.contains("S3cret!Pw"));
        assert!(section.contains("LOGIN CREDENTIALS"));
    }

    #[test]
    fn wrap_respects_the_column_limit() {
        let text = "one two three four five six seven eight nine ten";
        let lines = wrap_text(text, 12);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= 12, "line {:?} too long", line);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn wrap_handles_oversized_words() {
        let lines = wrap_text("tiny enormous-unbreakable-word tiny", 8);
        assert_eq!(lines.join(" "), "tiny enormous-unbreakable-word tiny");
    }
}
