pub mod dispatcher;
pub mod error;
pub mod report;
pub mod throttle;

pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use report::{SendOutcome, SendReport};
pub use throttle::Throttle;

pub const DEFAULT_BATCH_SIZE: u64 = 20;
pub const DEFAULT_THROTTLE_SECONDS: u64 = 2;
