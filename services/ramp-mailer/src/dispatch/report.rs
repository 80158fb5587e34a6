use serde::Serialize;

use crate::contacts::Contact;
use crate::storage::QuotaState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    pub contact: Contact,
    pub success: bool,
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn delivered(contact: Contact) -> Self {
        Self {
            contact,
            success: true,
            error: None,
        }
    }

    pub fn failed(contact: Contact, reason: impl Into<String>) -> Self {
        Self {
            contact,
            success: false,
            error: Some(reason.into()),
        }
    }
}

/// Result of one dispatch run.
///
/// `attempted` counts every send attempt, failed ones included; that is the
/// amount charged against the daily quota.
#[derive(Debug, Clone, Serialize)]
pub struct SendReport {
    pub attempted: u64,
    pub outcomes: Vec<SendOutcome>,
    pub pauses: u64,
    pub limit_reached: bool,
    pub quota: QuotaState,
}

impl SendReport {
    pub(crate) fn limit_reached(quota: QuotaState) -> Self {
        Self {
            attempted: 0,
            outcomes: Vec::new(),
            pauses: 0,
            limit_reached: true,
            quota,
        }
    }

    /// One-line result for the operator.
    pub fn summary(&self) -> String {
        if self.limit_reached {
            "Daily send limit reached.".to_string()
        } else {
            format!("Sent {} message(s).", self.attempted)
        }
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }
}
