use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::storage::{QuotaState, QuotaStore};

use super::error::QuotaError;
use super::policy::RampPolicy;

/// Couples a [`QuotaStore`] with a [`RampPolicy`].
///
/// A rollover is written back as soon as it is computed, so it survives even
/// if the send phase that follows fails.
#[derive(Debug, Clone)]
pub struct QuotaTracker<S> {
    store: S,
    policy: RampPolicy,
}

impl<S: QuotaStore> QuotaTracker<S> {
    pub fn new(store: S, policy: RampPolicy) -> Self {
        Self { store, policy }
    }

    /// Today's state, rolling over and persisting if the stored date differs.
    pub fn current(&self, today: NaiveDate) -> Result<QuotaState, QuotaError> {
        let stored = self.load_or_initial(today)?;

        let Some(rolled) = self.policy.roll_over(&stored, today) else {
            return Ok(stored);
        };

        if rolled.date < stored.date {
            warn!(
                stored_date = %stored.date,
                today = %today,
                "stored quota date is in the future; rolling over anyway"
            );
        }

        self.store.save(&rolled)?;
        info!(
            previous_date = %stored.date,
            date = %rolled.date,
            previous_limit = stored.limit,
            limit = rolled.limit,
            "daily quota rolled over"
        );
        Ok(rolled)
    }

    /// What [`current`](Self::current) would return, without persisting.
    pub fn preview(&self, today: NaiveDate) -> Result<QuotaState, QuotaError> {
        let stored = self.load_or_initial(today)?;
        Ok(self.policy.effective_limit(stored, today))
    }

    /// Adds `attempts` to the count and persists the result.
    pub fn record_attempts(
        &self,
        state: QuotaState,
        attempts: u64,
    ) -> Result<QuotaState, QuotaError> {
        let updated = QuotaState {
            count: state.count.saturating_add(attempts),
            ..state
        };
        self.store.save(&updated)?;
        debug!(
            attempts,
            count = updated.count,
            limit = updated.limit,
            "recorded send attempts"
        );
        Ok(updated)
    }

    fn load_or_initial(&self, today: NaiveDate) -> Result<QuotaState, QuotaError> {
        let state = self
            .store
            .load()?
            .unwrap_or_else(|| self.policy.initial_state(today));
        Ok(state)
    }
}
