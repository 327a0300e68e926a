//! Contact Mailer
//!
//! Validates contact form submissions and forwards them to the site owner,
//! either over SMTP or, when SMTP is not configured, to the log.

use std::sync::LazyLock;

use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::ContactForm;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

const NAME_LEN: (usize, usize) = (2, 100);
const EMAIL_MAX_LEN: usize = 254;
const SUBJECT_LEN: (usize, usize) = (5, 200);
const MESSAGE_LEN: (usize, usize) = (10, 5000);

/// Errors from validating or delivering a contact message
#[derive(Debug, Error)]
pub enum ContactError {
    /// One or more fields are invalid; each entry is a user-facing message
    #[error("Invalid contact form: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Invalid mail address: {0}")]
    Address(#[from] AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("Failed to deliver message: {0}")]
    Delivery(#[from] lettre::transport::smtp::Error),
}

/// Check every field of `form`, returning the trimmed form or all problems found
pub fn validate(form: &ContactForm) -> Result<ContactForm, ContactError> {
    let form = form.trimmed();
    let mut problems = Vec::new();

    check_length(&mut problems, "Name", &form.name, NAME_LEN);
    check_length(&mut problems, "Subject", &form.subject, SUBJECT_LEN);
    check_length(&mut problems, "Message", &form.message, MESSAGE_LEN);

    if form.email.len() > EMAIL_MAX_LEN || !EMAIL_RE.is_match(&form.email) {
        problems.push("Please enter a valid email address".to_string());
    }

    // Name and subject end up in mail headers
    if form.name.contains(['\r', '\n']) || form.subject.contains(['\r', '\n']) {
        problems.push("Name and subject must be a single line".to_string());
    }

    if problems.is_empty() {
        Ok(form)
    } else {
        Err(ContactError::Validation(problems))
    }
}

fn check_length(problems: &mut Vec<String>, field: &str, value: &str, (min, max): (usize, usize)) {
    let len = value.chars().count();
    if len < min || len > max {
        problems.push(format!("{field} must be between {min} and {max} characters"));
    }
}

/// Delivers validated contact messages
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, form: &ContactForm) -> Result<(), ContactError>;

    /// Short transport name for logs
    fn transport_name(&self) -> &'static str;
}

/// SMTP settings for [`SmtpMailer`]
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Recipient of contact messages
    pub contact_email: String,
}

/// Sends contact messages through an SMTP relay using STARTTLS
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer for `settings`
    ///
    /// # Errors
    ///
    /// Returns an error if the relay or one of the addresses is invalid
    pub fn new(settings: &SmtpSettings) -> Result<Self, ContactError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)?.port(settings.port);

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let to: Mailbox = settings.contact_email.parse()?;
        // Relays usually insist the sender is the authenticated account
        let from = match &settings.username {
            Some(username) if username.contains('@') => username.parse()?,
            _ => to.clone(),
        };

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, form: &ContactForm) -> Result<(), ContactError> {
        let reply_to = Mailbox::new(Some(form.name.clone()), form.email.parse()?);

        let message = Message::builder()
            .from(self.from.clone())
            .reply_to(reply_to)
            .to(self.to.clone())
            .subject(format!("[Contact] {}", form.subject))
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "From: {} <{}>\n\n{}",
                form.name, form.email, form.message
            ))?;

        self.transport.send(message).await?;
        info!(reply_to = %form.email, "Contact message delivered");
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "smtp"
    }
}

/// Writes contact messages to the log instead of sending them
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, form: &ContactForm) -> Result<(), ContactError> {
        warn!(
            name = %form.name,
            email = %form.email,
            subject = %form.subject,
            message_len = form.message.len(),
            "SMTP not configured, contact message logged only"
        );
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "log"
    }
}
