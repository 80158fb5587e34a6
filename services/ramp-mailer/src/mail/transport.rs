use async_trait::async_trait;

use super::{Email, MailError};

/// Opens delivery sessions.
///
/// Implement this trait to provide alternative backends or test doubles.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn MailSession>, MailError>;
}

/// A live connection held for the duration of one dispatch run.
///
/// A failed `send` affects only that message; the session stays usable.
#[async_trait]
pub trait MailSession: Send {
    async fn send(&mut self, email: &Email) -> Result<(), MailError>;

    async fn close(self: Box<Self>) -> Result<(), MailError>;
}
