use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("quota state at {} is malformed: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode quota state: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("another run holds the lock at {} (pid {})", .path.display(), display_pid(.pid))]
    Locked { path: PathBuf, pid: Option<u32> },
    #[error("quota store unavailable: {0}")]
    Unavailable(String),
}

fn display_pid(pid: &Option<u32>) -> String {
    pid.map_or_else(|| "unknown".to_string(), |pid| pid.to_string())
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: io::Error) -> StorageError {
    StorageError::Io {
        path: path.into(),
        source,
    }
}
