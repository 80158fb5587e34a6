pub mod error;
pub mod file;
pub mod lock;
pub mod memory;
pub mod state;

pub use error::StorageError;
pub use file::FileQuotaStore;
pub use lock::RunLock;
pub use memory::MemoryQuotaStore;
pub use state::QuotaState;

pub const DEFAULT_HISTORY_FILENAME: &str = "send_history.json";
pub const LOCK_SUFFIX: &str = "lock";

/// Persistence seam for the daily quota record.
///
/// `load` returns `Ok(None)` when nothing has been persisted yet; absence is
/// never an error. `save` replaces the whole record.
pub trait QuotaStore: Send + Sync {
    fn load(&self) -> Result<Option<QuotaState>, StorageError>;
    fn save(&self, state: &QuotaState) -> Result<(), StorageError>;
}
