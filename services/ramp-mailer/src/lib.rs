pub mod config;
pub mod contacts;
pub mod dispatch;
pub mod mail;
pub mod quota;
pub mod shutdown;
pub mod storage;

pub use config::MailerConfig;
pub use contacts::{Contact, ContactError, ContactSource, CsvContacts};
pub use dispatch::{DispatchError, Dispatcher, SendOutcome, SendReport, Throttle};
pub use mail::{
    Email, EmailBody, MailError, MailSession, MessageBuilder, MessageContent, SmtpTransport,
    Template, Transport,
};
pub use quota::{QuotaError, QuotaTracker, RampPolicy};
pub use shutdown::{run_locked, shutdown_signal, Interrupted};
pub use storage::{
    FileQuotaStore, MemoryQuotaStore, QuotaState, QuotaStore, RunLock, StorageError,
};
