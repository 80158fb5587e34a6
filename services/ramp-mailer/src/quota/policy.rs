use chrono::NaiveDate;

use crate::storage::QuotaState;

use super::error::QuotaError;
use super::{DEFAULT_INITIAL_LIMIT, DEFAULT_MAX_LIMIT, DEFAULT_RAMP_STEP};

/// Daily limit ramp: start at `initial_limit`, add `ramp_step` on each new
/// calendar day, never go past `max_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampPolicy {
    initial_limit: u64,
    max_limit: u64,
    ramp_step: u64,
}

impl Default for RampPolicy {
    fn default() -> Self {
        Self {
            initial_limit: DEFAULT_INITIAL_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            ramp_step: DEFAULT_RAMP_STEP,
        }
    }
}

impl RampPolicy {
    pub fn new(initial_limit: u64, max_limit: u64, ramp_step: u64) -> Result<Self, QuotaError> {
        if initial_limit > max_limit {
            return Err(QuotaError::InvalidPolicy(format!(
                "initial limit {initial_limit} exceeds max limit {max_limit}"
            )));
        }
        Ok(Self {
            initial_limit,
            max_limit,
            ramp_step,
        })
    }

    pub fn max_limit(&self) -> u64 {
        self.max_limit
    }

    pub fn initial_state(&self, today: NaiveDate) -> QuotaState {
        QuotaState::fresh(today, self.initial_limit)
    }

    /// Returns the rolled-over state, or `None` when `state` is already dated
    /// `today`.
    ///
    /// Exactly one step is applied however many days were skipped, and the
    /// count restarts at zero.
    pub fn roll_over(&self, state: &QuotaState, today: NaiveDate) -> Option<QuotaState> {
        if state.date == today {
            return None;
        }

        Some(QuotaState {
            date: today,
            limit: self.next_limit(state.limit),
            count: 0,
        })
    }

    /// The state to enforce today. Pure; persistence is the tracker's job.
    pub fn effective_limit(&self, state: QuotaState, today: NaiveDate) -> QuotaState {
        self.roll_over(&state, today).unwrap_or(state)
    }

    fn next_limit(&self, limit: u64) -> u64 {
        limit.saturating_add(self.ramp_step).min(self.max_limit)
    }
}
