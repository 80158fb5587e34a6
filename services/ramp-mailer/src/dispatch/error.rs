use thiserror::Error;

use crate::contacts::ContactError;
use crate::mail::MailError;
use crate::quota::QuotaError;

/// Errors that abort a dispatch run.
///
/// Per-recipient delivery failures are not here; they end up in
/// [`SendOutcome`](super::SendOutcome).
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to load contacts: {0}")]
    Contacts(#[from] ContactError),
    #[error("quota error: {0}")]
    Quota(#[from] QuotaError),
    #[error("failed to open mail transport: {0}")]
    Connect(#[source] MailError),
}
