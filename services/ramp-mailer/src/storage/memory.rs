use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::error::StorageError;
use super::state::QuotaState;
use super::QuotaStore;

/// In-memory [`QuotaStore`] for tests and dry runs.
///
/// Clones share the same record, so a test can keep a handle and inspect what
/// the dispatcher persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuotaStore {
    state: Arc<Mutex<Option<QuotaState>>>,
    saves: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: QuotaState) -> Self {
        let store = Self::default();
        *store.lock() = Some(state);
        store
    }

    pub fn snapshot(&self) -> Option<QuotaState> {
        *self.lock()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Makes every subsequent `save` fail, to exercise storage failure paths.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<QuotaState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QuotaStore for MemoryQuotaStore {
    fn load(&self) -> Result<Option<QuotaState>, StorageError> {
        Ok(*self.lock())
    }

    fn save(&self, state: &QuotaState) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store rejects writes".into()));
        }
        *self.lock() = Some(*state);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
