//! Bounded in-process notification queue drained by a fixed worker pool.
//! Every worker reads directly off the same `async_channel::Receiver`, so
//! there's no separate dispatcher task.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_channel::Receiver;
use async_channel::Sender;

use super::mail_client::MailClient;
use crate::domain::ContactEmail;
use crate::resilience::retry;
use crate::resilience::CircuitBreaker;

pub struct RegistrationSubmittedEvent {
    pub team_name: String,
    pub recipient: ContactEmail,
}

#[derive(Clone)]
pub struct NotificationQueue {
    sender: Sender<RegistrationSubmittedEvent>,
    dropped: Arc<AtomicU64>,
}

impl NotificationQueue {
    /// Enqueue `event`. Never surfaces an error: on a full queue the event
    /// is dropped and counted.
    pub fn send(
        &self,
        event: RegistrationSubmittedEvent,
    ) {
        if self.sender.try_send(event).is_err() {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(notifications_dropped_total = dropped, "notification queue full, dropping event");
        }
    }
}

/// Build the bounded channel and spawn `worker_count` workers draining it.
/// Returns the producer handle; the workers run until the process exits.
pub fn spawn(
    capacity: usize,
    worker_count: usize,
    mail_client: Arc<MailClient>,
    breaker: Arc<CircuitBreaker>,
    max_attempts_elapsed: Duration,
    initial_backoff: Duration,
) -> NotificationQueue {
    let (sender, receiver) = async_channel::bounded(capacity);

    for worker_id in 0..worker_count.max(1) {
        let receiver: Receiver<RegistrationSubmittedEvent> = receiver.clone();
        let mail_client = Arc::clone(&mail_client);
        let breaker = Arc::clone(&breaker);
        tokio::spawn(async move {
            while let Ok(event) = receiver.recv().await {
                tracing::info!(worker_id, team_name = %event.team_name, "sending registration notification");
                let html = format!("<p>Your team {} has been submitted.</p>", event.team_name);
                let text = format!("Your team {} has been submitted.", event.team_name);
                let result = breaker
                    .call(|| {
                        retry(
                            max_attempts_elapsed,
                            initial_backoff,
                            || mail_client.send_email(&event.recipient, "Team registration received", &html, &text),
                            |e| backoff::Error::transient(e),
                        )
                    })
                    .await;

                if let Err(e) = result {
                    tracing::error!(e.cause_chain = ?e, "failed to deliver registration notification");
                }
            }
        });
    }

    NotificationQueue { sender, dropped: Arc::new(AtomicU64::new(0)) }
}
