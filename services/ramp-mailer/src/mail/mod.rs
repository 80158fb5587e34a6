//! Message composition and delivery.
//!
//! Both halves sit outside the quota logic: [`MessageBuilder`] turns a contact
//! plus [`MessageContent`] into an [`Email`], and a [`Transport`] hands out a
//! [`MailSession`] that delivers it. [`SmtpTransport`] is the lettre-backed
//! production transport.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SMTP_HOST` | `localhost` | SMTP server hostname |
//! | `SMTP_PORT` | `25` | Port |
//! | `SMTP_TLS` | `none` | `none`, `starttls`, or `tls` |
//! | `SMTP_USERNAME` | unset | Username for authentication |
//! | `SMTP_PASSWORD` | unset | Password for authentication |
//! | `SMTP_TIMEOUT_SECS` | `10` | Connection timeout |
//! | `FROM_ADDR` | `newsletter@example.com` | Sender address |
//! | `UNSUBSCRIBE_URL` | `https://example.com/unsubscribe` | Link appended to every body |

mod message;
mod smtp;
mod template;
mod transport;

pub use message::{Email, EmailBody, MessageBuilder, MessageContent};
pub use smtp::{
    SmtpSettings, SmtpTransport, TlsMode, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT,
    DEFAULT_SMTP_TIMEOUT_SECS,
};
pub use template::Template;
pub use transport::{MailSession, Transport};

use thiserror::Error;

pub const DEFAULT_FROM_ADDR: &str = "newsletter@example.com";
pub const DEFAULT_UNSUBSCRIBE_URL: &str = "https://example.com/unsubscribe";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("message needs a text or an html body")]
    EmptyBody,

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("unsupported SMTP TLS mode: {0}")]
    UnsupportedTls(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}
