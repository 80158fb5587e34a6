#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use ramp_mailer::{
    Contact, Dispatcher, Email, MailError, MailSession, MemoryQuotaStore, MessageBuilder,
    MessageContent, QuotaTracker, RampPolicy, Template, Throttle, Transport,
};
use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct Recorded {
    pub connects: usize,
    pub closes: usize,
    pub sends: Vec<(String, Instant)>,
}

/// Transport double that records every call and rejects chosen recipients.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    recorded: Arc<Mutex<Recorded>>,
    reject: Arc<HashSet<String>>,
    refuse_connect: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(recipients: &[&str]) -> Self {
        Self {
            reject: Arc::new(recipients.iter().map(|r| r.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn refusing_connections() -> Self {
        Self {
            refuse_connect: true,
            ..Self::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.recorded.lock().unwrap().connects
    }

    pub fn closes(&self) -> usize {
        self.recorded.lock().unwrap().closes
    }

    pub fn recipients(&self) -> Vec<String> {
        self.recorded
            .lock()
            .unwrap()
            .sends
            .iter()
            .map(|(to, _)| to.clone())
            .collect()
    }

    pub fn send_times(&self) -> Vec<Instant> {
        self.recorded
            .lock()
            .unwrap()
            .sends
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn connect(&self) -> Result<Box<dyn MailSession>, MailError> {
        if self.refuse_connect {
            return Err(MailError::Smtp("connection refused".into()));
        }
        self.recorded.lock().unwrap().connects += 1;
        Ok(Box::new(RecordingSession {
            recorded: Arc::clone(&self.recorded),
            reject: Arc::clone(&self.reject),
        }))
    }
}

struct RecordingSession {
    recorded: Arc<Mutex<Recorded>>,
    reject: Arc<HashSet<String>>,
}

#[async_trait]
impl MailSession for RecordingSession {
    async fn send(&mut self, email: &Email) -> Result<(), MailError> {
        self.recorded
            .lock()
            .unwrap()
            .sends
            .push((email.to.clone(), Instant::now()));

        if self.reject.contains(&email.to) {
            return Err(MailError::Smtp(format!("550 mailbox unavailable: {}", email.to)));
        }
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), MailError> {
        self.recorded.lock().unwrap().closes += 1;
        Ok(())
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, d).expect("valid date")
}

pub fn contacts(n: usize) -> Vec<Contact> {
    (0..n)
        .map(|i| Contact::new(format!("Reader {i}"), format!("reader{i}@example.com")))
        .collect()
}

pub fn content() -> MessageContent {
    MessageContent::new(
        "Monthly Newsletter",
        Some(Template::new("<p>Hello {name},</p>")),
        Some(Template::new("Hello {name},")),
    )
    .expect("content has a body")
}

pub fn dispatcher(
    store: MemoryQuotaStore,
    transport: RecordingTransport,
    throttle: Throttle,
) -> Dispatcher<MemoryQuotaStore, RecordingTransport> {
    Dispatcher::new(
        QuotaTracker::new(store, RampPolicy::default()),
        transport,
        MessageBuilder::new("news@example.com", "https://example.com/unsubscribe"),
        throttle,
    )
}
