use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted daily quota record: `{"date": "YYYY-MM-DD", "limit": n, "count": n}`.
///
/// `count <= limit` is what the dispatcher aims for, but a hand-edited file may
/// break it. Callers must go through [`QuotaState::remaining`], which never
/// goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    pub date: NaiveDate,
    pub limit: u64,
    pub count: u64,
}

impl QuotaState {
    pub fn fresh(today: NaiveDate, initial_limit: u64) -> Self {
        Self {
            date: today,
            limit: initial_limit,
            count: 0,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.count)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn usage_percentage(&self) -> f64 {
        if self.limit == 0 {
            return 100.0;
        }
        (self.count as f64 / self.limit as f64) * 100.0
    }
}
