//! # Event Bus
//!
//! Abstraction over the pull-request event bus plus an in-memory adapter.
//!
//! Delivery is at-least-once with no ordering guarantee across events, even
//! events of the same pull request. Consumers signal through
//! [`ConsumeError`] whether a failed delivery is worth redelivering; the
//! redelivery/backoff policy lives entirely on this side of the boundary,
//! consumers never retry on their own.

use crate::events::{Event, EventId, PullReqEvent, PullReqEventKind};
use crate::retry::RedeliveryPolicy;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

// ============================================================================
// Consumer Interface
// ============================================================================

/// Failure of one delivery attempt, classified for the redelivery decision.
#[derive(Debug, thiserror::Error)]
pub enum ConsumeError {
    /// Worth redelivering; the backoff policy applies.
    #[error("transient consume failure: {0}")]
    Transient(String),

    /// Redelivery would fail the same way; the event is dropped.
    #[error("permanent consume failure: {0}")]
    Permanent(String),

    /// The delivery context was cancelled; dropped without a failure log.
    #[error("consume cancelled")]
    Cancelled,
}

impl ConsumeError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// A subscriber processing events delivered by the bus.
///
/// Implementations must tolerate redelivery of the same event id.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    async fn consume(
        &self,
        event: &Event<PullReqEvent>,
        cancel: &CancellationToken,
    ) -> Result<(), ConsumeError>;
}

// ============================================================================
// Bus Interface
// ============================================================================

/// Failure of a bus operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BusError {
    #[error("event bus is shut down")]
    Closed,
}

/// Publish/subscribe interface of the pull-request event bus.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an event; returns the generated event id.
    async fn publish(&self, payload: PullReqEvent) -> Result<EventId, BusError>;

    /// Register a consumer for the given lifecycle kinds.
    ///
    /// Deliveries run under `cancel`; cancelling it aborts in-flight
    /// triggers mid-lookup, while [`Subscription::cancel`] stops intake and
    /// lets in-flight deliveries drain.
    fn subscribe(
        &self,
        kinds: &[PullReqEventKind],
        consumer: Arc<dyn EventConsumer>,
        cancel: CancellationToken,
    ) -> Result<Subscription, BusError>;
}

/// Handle on an active subscription.
///
/// Dropping the handle leaves the workers running; call
/// [`Subscription::cancel`] for an orderly stop.
pub struct Subscription {
    stop: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(stop: CancellationToken, workers: Vec<JoinHandle<()>>) -> Self {
        Self { stop, workers }
    }

    /// Stop accepting new deliveries and wait for in-flight ones to finish.
    pub async fn cancel(self) {
        self.stop.cancel();
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

// ============================================================================
// In-Memory Adapter
// ============================================================================

/// In-memory event bus for development wiring and tests.
///
/// Runs a pool of worker tasks per subscription and redelivers on transient
/// consumer failure according to the configured [`RedeliveryPolicy`].
#[derive(Clone)]
pub struct InMemoryEventBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    subscribers: RwLock<Vec<SubscriberEntry>>,
    closed: AtomicBool,
    concurrency: usize,
    policy: RedeliveryPolicy,
}

struct SubscriberEntry {
    kinds: HashSet<PullReqEventKind>,
    tx: mpsc::UnboundedSender<Event<PullReqEvent>>,
}

impl InMemoryEventBus {
    /// Bus with a single worker per subscription and the default policy.
    pub fn new() -> Self {
        Self::with_options(1, RedeliveryPolicy::default())
    }

    pub fn with_options(concurrency: usize, policy: RedeliveryPolicy) -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: RwLock::new(Vec::new()),
                closed: AtomicBool::new(false),
                concurrency: concurrency.max(1),
                policy,
            }),
        }
    }

    /// Reject further publishes. Subscriptions drain independently via
    /// [`Subscription::cancel`].
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, payload: PullReqEvent) -> Result<EventId, BusError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(BusError::Closed);
        }

        let id = EventId::new();
        let kind = payload.kind();

        let subscribers = self.inner.subscribers.read().unwrap();
        for entry in subscribers.iter().filter(|e| e.kinds.contains(&kind)) {
            // A send failure means the subscription already drained; the
            // publisher does not care.
            let _ = entry.tx.send(Event {
                id,
                payload: payload.clone(),
            });
        }

        Ok(id)
    }

    fn subscribe(
        &self,
        kinds: &[PullReqEventKind],
        consumer: Arc<dyn EventConsumer>,
        cancel: CancellationToken,
    ) -> Result<Subscription, BusError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(BusError::Closed);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.subscribers.write().unwrap().push(SubscriberEntry {
            kinds: kinds.iter().copied().collect(),
            tx,
        });

        let rx = Arc::new(Mutex::new(rx));
        let stop = CancellationToken::new();
        let workers = (0..self.inner.concurrency)
            .map(|_| {
                tokio::spawn(worker_loop(
                    Arc::clone(&rx),
                    Arc::clone(&consumer),
                    self.inner.policy.clone(),
                    stop.clone(),
                    cancel.clone(),
                ))
            })
            .collect();

        Ok(Subscription::new(stop, workers))
    }
}

/// One worker of a subscription pool.
///
/// Workers take turns waiting on the shared receiver; whoever holds it when
/// an event arrives releases it before processing, so the rest of the pool
/// keeps consuming concurrently.
async fn worker_loop(
    rx: Arc<Mutex<mpsc::UnboundedReceiver<Event<PullReqEvent>>>>,
    consumer: Arc<dyn EventConsumer>,
    policy: RedeliveryPolicy,
    stop: CancellationToken,
    cancel: CancellationToken,
) {
    loop {
        let event = {
            let mut guard = tokio::select! {
                biased;
                _ = stop.cancelled() => return,
                guard = rx.lock() => guard,
            };
            tokio::select! {
                biased;
                _ = stop.cancelled() => return,
                received = guard.recv() => match received {
                    Some(event) => event,
                    None => return,
                },
            }
        };

        deliver(consumer.as_ref(), &event, &policy, &stop, &cancel).await;
    }
}

/// Deliver one event, redelivering on transient failure per the policy.
async fn deliver(
    consumer: &dyn EventConsumer,
    event: &Event<PullReqEvent>,
    policy: &RedeliveryPolicy,
    stop: &CancellationToken,
    cancel: &CancellationToken,
) {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match consumer.consume(event, cancel).await {
            Ok(()) => return,
            Err(ConsumeError::Cancelled) => {
                debug!(event_id = %event.id, "delivery cancelled");
                return;
            }
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_for_attempt(attempt);
                debug!(
                    event_id = %event.id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient consume failure, redelivering"
                );
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            Err(err) if err.is_transient() => {
                error!(
                    event_id = %event.id,
                    attempts = attempt,
                    error = %err,
                    "redelivery attempts exhausted, dropping event"
                );
                return;
            }
            Err(err) => {
                warn!(event_id = %event.id, error = %err, "permanent consume failure, dropping event");
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
