//! Refresh outcome emails.
//!
//! One plain-text message per `refresh` run, sent whether the run succeeded
//! or failed. Sending is generic over [`lettre::Transport`]; the CLI uses an
//! unencrypted SMTP relay, `localhost:25` by default.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

pub const DEFAULT_SMTP_SERVER: &str = "localhost";
pub const DEFAULT_SMTP_PORT: u16 = 25;

pub const SUCCESS_BODY: &str = "AoU refresh success!";
pub const FAILURE_BODY: &str =
    "There was an issue during the AoU data refresh. Please check the log.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    Succeeded,
    Failed,
}

impl RefreshStatus {
    fn body(self) -> &'static str {
        match self {
            Self::Succeeded => SUCCESS_BODY,
            Self::Failed => FAILURE_BODY,
        }
    }
}

/// Validated sender, recipients and relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub server: String,
    pub port: u16,
    pub from: Mailbox,
    pub to: Vec<Mailbox>,
}

impl EmailSettings {
    /// `to` holds one address or several separated by commas.
    pub fn new(server: &str, port: u16, from: &str, to: &str) -> Result<Self> {
        let from = from
            .trim()
            .parse::<Mailbox>()
            .with_context(|| format!("from-email '{from}'"))?;
        let to = to
            .split(',')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(|address| {
                address
                    .parse::<Mailbox>()
                    .with_context(|| format!("to-email '{address}'"))
            })
            .collect::<Result<Vec<Mailbox>>>()?;
        anyhow::ensure!(!to.is_empty(), "to-email has no addresses");
        Ok(Self {
            server: server.to_string(),
            port,
            from,
            to,
        })
    }
}

pub struct Notifier<T> {
    transport: T,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl Notifier<SmtpTransport> {
    pub fn smtp(settings: &EmailSettings) -> Self {
        let transport = SmtpTransport::builder_dangerous(&settings.server)
            .port(settings.port)
            .build();
        Self::new(transport, settings)
    }
}

impl<T> Notifier<T> {
    pub fn new(transport: T, settings: &EmailSettings) -> Self {
        Self {
            transport,
            from: settings.from.clone(),
            to: settings.to.clone(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The message for a run finishing with `status` on `date`.
    pub fn message(&self, status: RefreshStatus, date: NaiveDate) -> Result<Message> {
        let builder = self.to.iter().fold(
            Message::builder()
                .from(self.from.clone())
                .subject(format!("AoU Refresh {}", date.format("%Y-%m-%d")))
                .header(ContentType::TEXT_PLAIN),
            |builder, to| builder.to(to.clone()),
        );
        builder
            .body(status.body().to_string())
            .context("build refresh email")
    }
}

impl<T> Notifier<T>
where
    T: Transport,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    pub fn notify(&self, status: RefreshStatus, date: NaiveDate) -> Result<()> {
        let message = self.message(status, date)?;
        self.transport
            .send(&message)
            .context("send refresh email")?;
        info!(?status, recipients = self.to.len(), "refresh email sent");
        Ok(())
    }

    /// Sends the email, logging a failure instead of returning it.
    pub fn notify_or_warn(&self, status: RefreshStatus, date: NaiveDate) {
        if let Err(err) = self.notify(status, date) {
            warn!(error = %format!("{err:#}"), "refresh email not sent");
        }
    }
}
