pub mod error;
pub mod policy;
pub mod tracker;

pub use error::QuotaError;
pub use policy::RampPolicy;
pub use tracker::QuotaTracker;

pub const DEFAULT_INITIAL_LIMIT: u64 = 100;
pub const DEFAULT_MAX_LIMIT: u64 = 1000;
pub const DEFAULT_RAMP_STEP: u64 = 100;
