use crate::template::{render_report, ReportStats};
use async_trait::async_trait;
use chrono::Utc;
use interfaces::{AnalysisResult, RenderedReport};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::AsyncSmtpTransportBuilder;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

// SMTP replies that mean the server rejected our credentials.
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
    pub timeout_seconds: u64,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("sender_email", &self.sender_email)
            .field("sender_password", &"<redacted>")
            .field("recipient_email", &self.recipient_email)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Email authentication failed - check credentials ({0})")]
    Authentication(String),

    #[error("SMTP error: {0}")]
    Transport(String),

    #[error("Unexpected email error: {0}")]
    Unexpected(String),
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        let message = err.to_string();
        let auth_rejected = err
            .status()
            .map(|code| AUTH_FAILURE_CODES.contains(&code.to_string().as_str()))
            .unwrap_or(false);

        if auth_rejected {
            MailError::Authentication(message)
        } else if err.is_permanent() || err.is_transient() || err.is_response() || err.is_timeout() {
            MailError::Transport(message)
        } else {
            MailError::Unexpected(message)
        }
    }
}

/// Something that can put a finished message on the wire.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: Message) -> Result<(), MailError>;
}

/// STARTTLS SMTP relay backed by lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(Self::configure(builder, config))
    }

    /// Plain SMTP with no TLS at all. Only for relays on a trusted local link.
    pub fn unencrypted(config: &MailConfig) -> Self {
        Self::configure(
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host),
            config,
        )
    }

    fn configure(builder: AsyncSmtpTransportBuilder, config: &MailConfig) -> Self {
        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.sender_email.clone(),
                config.sender_password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_seconds)))
            .build();
        Self { transport }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, message: Message) -> Result<(), MailError> {
        self.transport.send(message).await?;
        Ok(())
    }
}

pub struct ReportSender<T: MailTransport = SmtpMailer> {
    config: MailConfig,
    transport: T,
}

impl ReportSender<SmtpMailer> {
    pub fn connect(config: &MailConfig) -> anyhow::Result<Self> {
        let transport = SmtpMailer::new(config)?;
        info!("Email generator initialized successfully");
        Ok(Self::with_transport(config.clone(), transport))
    }
}

impl<T: MailTransport> ReportSender<T> {
    pub fn with_transport(config: MailConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_message(&self, report: RenderedReport) -> Result<Message, MailError> {
        let from: Mailbox = self
            .config
            .sender_email
            .parse()
            .map_err(|e| MailError::Unexpected(format!("invalid sender address: {e}")))?;
        let to: Mailbox = self
            .config
            .recipient_email
            .parse()
            .map_err(|e| MailError::Unexpected(format!("invalid recipient address: {e}")))?;

        let (subject, html, plain_text) = report.into_parts();
        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(plain_text, html))
            .map_err(|e| MailError::Unexpected(e.to_string()))
    }

    async fn try_send(&self, analysis: &AnalysisResult, stats: ReportStats) -> Result<(), MailError> {
        info!("Generating HTML email content...");
        let report = render_report(&analysis.text, &analysis.provider_label, stats, Utc::now());
        let message = self.build_message(report)?;

        info!(
            "Sending email to {} via {}:{}...",
            self.config.recipient_email, self.config.smtp_host, self.config.smtp_port
        );
        self.transport.deliver(message).await
    }

    /// Render and deliver the report. Failures are logged and reported as `false`.
    pub async fn send_report(&self, analysis: &AnalysisResult, stats: ReportStats) -> bool {
        match self.try_send(analysis, stats).await {
            Ok(()) => {
                info!("✅ Email sent successfully!");
                true
            }
            Err(e) => {
                error!("❌ {}", e);
                false
            }
        }
    }

    pub fn close(self) {
        info!("Closing mail transport");
        drop(self.transport);
    }
}
