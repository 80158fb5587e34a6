use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::debug;

use super::error::{io_err, StorageError};
use super::state::QuotaState;
use super::QuotaStore;

/// JSON-file backed quota store.
///
/// Saves go through a sibling `.tmp` file that is fsynced and renamed over the
/// target, so a reader never observes a half-written record.
#[derive(Debug, Clone)]
pub struct FileQuotaStore {
    path: PathBuf,
}

impl FileQuotaStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl QuotaStore for FileQuotaStore {
    fn load(&self) -> Result<Option<QuotaState>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no quota state persisted yet");
                return Ok(None);
            }
            Err(source) => return Err(io_err(&self.path, source)),
        };

        let state = serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(state))
    }

    fn save(&self, state: &QuotaState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| io_err(parent, source))?;
        }

        let payload = serde_json::to_vec(state).map_err(StorageError::Encode)?;
        let tmp_path = self.tmp_path();

        let mut file = File::create(&tmp_path).map_err(|source| io_err(&tmp_path, source))?;
        file.write_all(&payload)
            .map_err(|source| io_err(&tmp_path, source))?;
        file.sync_all().map_err(|source| io_err(&tmp_path, source))?;

        fs::rename(&tmp_path, &self.path).map_err(|source| io_err(&self.path, source))?;
        debug!(
            path = %self.path.display(),
            date = %state.date,
            limit = state.limit,
            count = state.count,
            "persisted quota state"
        );
        Ok(())
    }
}
