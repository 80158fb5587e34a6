use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("invalid ramp policy: {0}")]
    InvalidPolicy(String),
    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),
}
