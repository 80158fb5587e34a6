//! Single-instance guard for the quota state file.
//!
//! The quota file has no record-level locking, so two concurrent `send` runs
//! would both read the same count and one increment would be lost. A run
//! takes `<history file>.lock` with create-new semantics and holds it until it
//! finishes. A lock left behind by a crashed process has to be removed by hand;
//! the error names the pid recorded in it.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{io_err, StorageError};
use super::LOCK_SUFFIX;

#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    released: bool,
}

impl RunLock {
    pub fn acquire(state_path: &Path) -> Result<Self, StorageError> {
        let path = lock_path_for(state_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| io_err(parent, source))?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                let pid = fs::read_to_string(&path)
                    .ok()
                    .and_then(|raw| raw.trim().parse().ok());
                return Err(StorageError::Locked { path, pid });
            }
            Err(source) => return Err(io_err(path, source)),
        };

        writeln!(file, "{}", std::process::id()).map_err(|source| io_err(&path, source))?;
        file.sync_all().map_err(|source| io_err(&path, source))?;
        debug!(path = %path.display(), "acquired run lock");

        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) -> Result<(), StorageError> {
        self.released = true;
        fs::remove_file(&self.path).map_err(|source| io_err(&self.path, source))
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if !self.released {
            if let Err(err) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %err, "failed to remove run lock");
            }
        }
    }
}

pub fn lock_path_for(state_path: &Path) -> PathBuf {
    let mut name = state_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(LOCK_SUFFIX);
    state_path.with_file_name(name)
}
