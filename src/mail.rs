use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{Address, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};

use crate::config::Security;

/// A composed plain-text message, independent of any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: Address,
    pub to: Vec<Address>,
    pub subject: String,
    pub body: String,
}

impl OutgoingEmail {
    pub fn to_message(&self) -> Result<Message> {
        let mut builder = Message::builder()
            .from(Mailbox::new(None, self.from.clone()))
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        for to in &self.to {
            builder = builder.to(Mailbox::new(None, to.clone()));
        }
        builder
            .body(self.body.clone())
            .context("failed to build email message")
    }
}

/// Something that can deliver one message. Implemented over SMTP for real
/// use and by recording fakes in tests.
pub trait Mailer {
    fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

/// Authenticated SMTP delivery. Each `send` opens its own connection.
pub struct SmtpMailer {
    host: String,
    port: u16,
    security: Security,
    username: String,
    password: SecretString,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        security: Security,
        username: &str,
        password: SecretString,
    ) -> Self {
        Self {
            host: host.to_string(),
            port,
            security,
            username: username.to_string(),
            password,
        }
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let builder = match self.security {
            Security::Tls => SmtpTransport::relay(&self.host),
            Security::Starttls => SmtpTransport::starttls_relay(&self.host),
        }
        .with_context(|| format!("failed to configure SMTP relay {}", self.host))?;
        let credentials = SmtpCredentials::new(
            self.username.clone(),
            self.password.expose_secret().to_string(),
        );
        Ok(builder.port(self.port).credentials(credentials).build())
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let message = email.to_message()?;
        let transport = self.transport()?;
        log::info!(
            "sending '{}' to {} recipient(s) via {}:{}",
            email.subject,
            email.to.len(),
            self.host,
            self.port
        );
        transport
            .send(&message)
            .with_context(|| format!("failed to send email via {}:{}", self.host, self.port))?;
        Ok(())
    }
}
