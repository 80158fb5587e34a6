//! Signal handling for a locked send run.
//!
//! Termination is the only way to cancel a run. The run future is raced
//! against SIGINT/SIGTERM so that the [`RunLock`] is dropped, and the lock file
//! removed, before the process exits. Attempts made by an interrupted run are
//! not added to the persisted count. A SIGKILL still leaves the lock behind.

use std::future::Future;

use thiserror::Error;
use tokio::signal;
use tracing::warn;

use crate::storage::RunLock;

#[derive(Debug, Error)]
#[error("send run interrupted by {signal}")]
pub struct Interrupted {
    pub signal: &'static str,
}

/// Drives `work` while holding `lock`, giving up when `shutdown` resolves
/// first. The lock is released on both paths.
pub async fn run_locked<F, S>(lock: RunLock, work: F, shutdown: S) -> Result<F::Output, Interrupted>
where
    F: Future,
    S: Future<Output = &'static str>,
{
    let outcome = tokio::select! {
        output = work => Ok(output),
        signal = shutdown => Err(Interrupted { signal }),
    };

    if let Err(interrupted) = &outcome {
        warn!(
            signal = interrupted.signal,
            lock = %lock.path().display(),
            "send run interrupted; releasing run lock"
        );
    }
    if let Err(err) = lock.release() {
        warn!(error = %err, "failed to release run lock");
    }

    outcome
}

/// Resolves with the name of the first termination signal received.
pub async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
