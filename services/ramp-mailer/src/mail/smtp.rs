//! SMTP transport using lettre.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::PoolConfig;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::message::{Email, EmailBody};
use super::transport::{MailSession, Transport};
use super::MailError;

pub const DEFAULT_SMTP_HOST: &str = "localhost";
pub const DEFAULT_SMTP_PORT: u16 = 25;
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Plain connection, no TLS.
    #[default]
    None,
    /// Upgrade with STARTTLS after connecting.
    StartTls,
    /// Implicit TLS from the first byte.
    Tls,
}

impl FromStr for TlsMode {
    type Err = MailError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "starttls" => Ok(Self::StartTls),
            "tls" => Ok(Self::Tls),
            other => Err(MailError::UnsupportedTls(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub tls: TlsMode,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SmtpTransport {
    settings: SmtpSettings,
}

impl SmtpTransport {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let settings = &self.settings;
        let mut builder = match settings.tls {
            TlsMode::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            }
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| MailError::Smtp(e.to_string()))?,
            TlsMode::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                    .map_err(|e| MailError::Smtp(e.to_string()))?
            }
        };

        builder = builder
            .port(settings.port)
            .timeout(Some(settings.timeout))
            .pool_config(PoolConfig::new().max_size(1));

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    async fn connect(&self) -> Result<Box<dyn MailSession>, MailError> {
        let transport = self.build_transport()?;

        let ready = transport
            .test_connection()
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;
        if !ready {
            return Err(MailError::Smtp(format!(
                "{}:{} did not accept the connection",
                self.settings.host, self.settings.port
            )));
        }

        debug!(
            host = %self.settings.host,
            port = self.settings.port,
            "smtp session opened"
        );
        Ok(Box::new(SmtpSession { transport }))
    }
}

struct SmtpSession {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

#[async_trait]
impl MailSession for SmtpSession {
    async fn send(&mut self, email: &Email) -> Result<(), MailError> {
        let message = to_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), MailError> {
        let SmtpSession { transport } = *self;
        drop(transport);
        debug!("smtp session closed");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}

/// Convert an [`Email`] into a lettre [`Message`].
fn to_message(email: &Email) -> Result<Message, MailError> {
    let builder = Message::builder()
        .from(parse_mailbox(&email.from)?)
        .to(parse_mailbox(&email.to)?)
        .subject(email.subject.as_str());

    let message = match &email.body {
        EmailBody::Text(text) => builder
            .singlepart(SinglePart::plain(text.clone()))
            .map_err(|e| MailError::Build(e.to_string()))?,
        EmailBody::Html(html) => builder
            .singlepart(SinglePart::html(html.clone()))
            .map_err(|e| MailError::Build(e.to_string()))?,
        EmailBody::Multipart { text, html } => builder
            .multipart(MultiPart::alternative_plain_html(text.clone(), html.clone()))
            .map_err(|e| MailError::Build(e.to_string()))?,
    };

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(body: EmailBody) -> Email {
        Email {
            from: "news@example.com".into(),
            to: "ada@example.com".into(),
            subject: "Monthly".into(),
            body,
        }
    }

    #[test]
    fn parses_tls_modes() {
        assert_eq!("none".parse::<TlsMode>().unwrap(), TlsMode::None);
        assert_eq!("STARTTLS".parse::<TlsMode>().unwrap(), TlsMode::StartTls);
        assert_eq!("tls".parse::<TlsMode>().unwrap(), TlsMode::Tls);
        assert!(matches!(
            "ssl".parse::<TlsMode>(),
            Err(MailError::UnsupportedTls(_))
        ));
    }

    #[test]
    fn multipart_message_carries_both_parts() {
        let message = to_message(&email(EmailBody::Multipart {
            text: "plain body".into(),
            html: "<p>rich body</p>".into(),
        }))
        .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("plain body"));
        assert!(raw.contains("<p>rich body</p>"));
        assert!(raw.contains("To: ada@example.com"));
    }

    #[test]
    fn invalid_recipient_is_rejected() {
        let mut bad = email(EmailBody::Text("hi".into()));
        bad.to = "not an address".into();

        assert!(matches!(
            to_message(&bad),
            Err(MailError::InvalidAddress(addr)) if addr == "not an address"
        ));
    }
}
