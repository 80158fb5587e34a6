use chrono::{NaiveDate, Utc};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::contacts::{Contact, ContactSource};
use crate::mail::{MailSession, MessageBuilder, MessageContent, Transport};
use crate::quota::QuotaTracker;
use crate::storage::QuotaStore;

use super::error::DispatchError;
use super::report::{SendOutcome, SendReport};
use super::throttle::Throttle;

/// Sends one message per contact, within today's remaining quota.
///
/// Runs are sequential: one transport session, one send at a time, and the
/// throttle pause blocks the whole run. A failed delivery is logged, recorded
/// in the report, and still charged against the quota.
pub struct Dispatcher<S, T> {
    tracker: QuotaTracker<S>,
    transport: T,
    builder: MessageBuilder,
    throttle: Throttle,
}

impl<S: QuotaStore, T: Transport> Dispatcher<S, T> {
    pub fn new(
        tracker: QuotaTracker<S>,
        transport: T,
        builder: MessageBuilder,
        throttle: Throttle,
    ) -> Self {
        Self {
            tracker,
            transport,
            builder,
            throttle,
        }
    }

    pub async fn run<C: ContactSource + ?Sized>(
        &self,
        contacts: &C,
        content: &MessageContent,
    ) -> Result<SendReport, DispatchError> {
        self.run_on(Utc::now().date_naive(), contacts, content).await
    }

    /// [`run`](Self::run) with an explicit UTC calendar day.
    pub async fn run_on<C: ContactSource + ?Sized>(
        &self,
        today: NaiveDate,
        contacts: &C,
        content: &MessageContent,
    ) -> Result<SendReport, DispatchError> {
        let span = info_span!("dispatch", run_id = %Uuid::new_v4(), %today);
        self.dispatch(today, contacts, content)
            .instrument(span)
            .await
    }

    async fn dispatch<C: ContactSource + ?Sized>(
        &self,
        today: NaiveDate,
        contacts: &C,
        content: &MessageContent,
    ) -> Result<SendReport, DispatchError> {
        let contacts = contacts.load()?;
        let state = self.tracker.current(today)?;
        let remaining = state.remaining();

        if state.is_exhausted() {
            warn!(
                limit = state.limit,
                count = state.count,
                "daily send limit reached"
            );
            return Ok(SendReport::limit_reached(state));
        }

        info!(
            contacts = contacts.len(),
            limit = state.limit,
            count = state.count,
            remaining,
            "starting dispatch"
        );

        let session = self
            .transport
            .connect()
            .await
            .map_err(DispatchError::Connect)?;

        let budget = usize::try_from(remaining).unwrap_or(usize::MAX);
        let (attempted, outcomes, pauses) = self.send_all(session, contacts, budget, content).await;

        let quota = self.tracker.record_attempts(state, attempted)?;
        info!(
            attempted,
            delivered = outcomes.iter().filter(|o| o.success).count(),
            count = quota.count,
            limit = quota.limit,
            "dispatch finished"
        );

        Ok(SendReport {
            attempted,
            outcomes,
            pauses,
            limit_reached: false,
            quota,
        })
    }

    /// Works through at most `budget` contacts, then closes the session.
    /// Nothing in here returns early, so the close always runs.
    async fn send_all(
        &self,
        mut session: Box<dyn MailSession>,
        contacts: Vec<Contact>,
        budget: usize,
        content: &MessageContent,
    ) -> (u64, Vec<SendOutcome>, u64) {
        let mut attempted = 0u64;
        let mut pauses = 0u64;
        let mut outcomes = Vec::with_capacity(contacts.len().min(budget));

        for contact in contacts.into_iter().take(budget) {
            let email = self.builder.build(&contact, content);

            match session.send(&email).await {
                Ok(()) => {
                    info!(recipient = %contact.email, "sent message");
                    outcomes.push(SendOutcome::delivered(contact));
                }
                Err(err) => {
                    error!(recipient = %contact.email, error = %err, "failed to send message");
                    outcomes.push(SendOutcome::failed(contact, err.to_string()));
                }
            }

            attempted += 1;
            if self.throttle.after_attempt(attempted).await {
                pauses += 1;
            }
        }

        if let Err(err) = session.close().await {
            warn!(error = %err, "failed to close mail session");
        }

        (attempted, outcomes, pauses)
    }
}
