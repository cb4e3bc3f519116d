//! Tests for the in-memory event bus.

use super::*;
use crate::events::{PullReqCreated, PullReqMerged};
use crate::{PrincipalId, PullReqId};
use std::sync::atomic::AtomicU32;
use std::time::Duration;

// ============================================================================
// Test Consumers
// ============================================================================

/// Records every delivered event and fails the first `fail_times` attempts.
struct ScriptedConsumer {
    delivered: Mutex<Vec<Event<PullReqEvent>>>,
    attempts: AtomicU32,
    fail_times: u32,
    failure: fn(String) -> ConsumeError,
}

impl ScriptedConsumer {
    fn succeeding() -> Arc<Self> {
        Self::failing_first(0, ConsumeError::Transient)
    }

    fn failing_first(fail_times: u32, failure: fn(String) -> ConsumeError) -> Arc<Self> {
        Arc::new(Self {
            delivered: Mutex::new(Vec::new()),
            attempts: AtomicU32::new(0),
            fail_times,
            failure,
        })
    }

    async fn delivered(&self) -> Vec<Event<PullReqEvent>> {
        self.delivered.lock().await.clone()
    }

    fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventConsumer for ScriptedConsumer {
    async fn consume(
        &self,
        event: &Event<PullReqEvent>,
        _cancel: &CancellationToken,
    ) -> Result<(), ConsumeError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_times {
            return Err((self.failure)("scripted failure".to_string()));
        }
        self.delivered.lock().await.push(event.clone());
        Ok(())
    }
}

/// Consumer that always reports cancellation.
struct CancelledConsumer {
    attempts: AtomicU32,
}

#[async_trait]
impl EventConsumer for CancelledConsumer {
    async fn consume(
        &self,
        _event: &Event<PullReqEvent>,
        _cancel: &CancellationToken,
    ) -> Result<(), ConsumeError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ConsumeError::Cancelled)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn created_event() -> PullReqEvent {
    PullReqEvent::Created(PullReqCreated {
        principal_id: PrincipalId::new(7),
        pull_req_id: PullReqId::new(42),
        source_sha: "abc123".to_string(),
    })
}

fn merged_event() -> PullReqEvent {
    PullReqEvent::Merged(PullReqMerged {
        principal_id: PrincipalId::new(7),
        pull_req_id: PullReqId::new(42),
        merge_sha: "fff000".to_string(),
    })
}

fn fast_policy() -> RedeliveryPolicy {
    RedeliveryPolicy::new(
        3,
        Duration::from_millis(5),
        Duration::from_millis(20),
        2.0,
    )
    .without_jitter()
}

/// Poll until `check` passes or the deadline expires.
async fn wait_until<F>(check: F)
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within deadline"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn delivers_only_subscribed_kinds() {
    let bus = InMemoryEventBus::with_options(1, fast_policy());
    let consumer = ScriptedConsumer::succeeding();
    let subscription = bus
        .subscribe(
            &[PullReqEventKind::Created],
            consumer.clone(),
            CancellationToken::new(),
        )
        .unwrap();

    bus.publish(merged_event()).await.unwrap();
    let created_id = bus.publish(created_event()).await.unwrap();

    wait_until(|| consumer.attempts() >= 1).await;
    subscription.cancel().await;

    let delivered = consumer.delivered().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].id, created_id);
    assert_eq!(delivered[0].payload.kind(), PullReqEventKind::Created);
}

#[tokio::test]
async fn redelivers_on_transient_failure_until_success() {
    let bus = InMemoryEventBus::with_options(1, fast_policy());
    let consumer = ScriptedConsumer::failing_first(2, ConsumeError::Transient);
    let subscription = bus
        .subscribe(
            &[PullReqEventKind::Created],
            consumer.clone(),
            CancellationToken::new(),
        )
        .unwrap();

    let id = bus.publish(created_event()).await.unwrap();

    wait_until(|| consumer.attempts() >= 3).await;
    subscription.cancel().await;

    let delivered = consumer.delivered().await;
    assert_eq!(consumer.attempts(), 3);
    assert_eq!(delivered.len(), 1);
    // Redelivery reuses the original event id.
    assert_eq!(delivered[0].id, id);
}

#[tokio::test]
async fn drops_after_redelivery_attempts_exhausted() {
    let bus = InMemoryEventBus::with_options(1, fast_policy());
    let consumer = ScriptedConsumer::failing_first(10, ConsumeError::Transient);
    let subscription = bus
        .subscribe(
            &[PullReqEventKind::Created],
            consumer.clone(),
            CancellationToken::new(),
        )
        .unwrap();

    bus.publish(created_event()).await.unwrap();

    wait_until(|| consumer.attempts() >= 3).await;
    // Give the worker a chance to over-deliver before asserting it stopped.
    tokio::time::sleep(Duration::from_millis(50)).await;
    subscription.cancel().await;

    assert_eq!(consumer.attempts(), 3);
    assert!(consumer.delivered().await.is_empty());
}

#[tokio::test]
async fn permanent_failure_is_not_redelivered() {
    let bus = InMemoryEventBus::with_options(1, fast_policy());
    let consumer = ScriptedConsumer::failing_first(10, ConsumeError::Permanent);
    let subscription = bus
        .subscribe(
            &[PullReqEventKind::Created],
            consumer.clone(),
            CancellationToken::new(),
        )
        .unwrap();

    bus.publish(created_event()).await.unwrap();

    wait_until(|| consumer.attempts() >= 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    subscription.cancel().await;

    assert_eq!(consumer.attempts(), 1);
}

#[tokio::test]
async fn cancelled_delivery_is_not_redelivered() {
    let bus = InMemoryEventBus::with_options(1, fast_policy());
    let consumer = Arc::new(CancelledConsumer {
        attempts: AtomicU32::new(0),
    });
    let subscription = bus
        .subscribe(
            &[PullReqEventKind::Created],
            consumer.clone(),
            CancellationToken::new(),
        )
        .unwrap();

    bus.publish(created_event()).await.unwrap();

    wait_until(|| consumer.attempts.load(Ordering::SeqCst) >= 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    subscription.cancel().await;

    assert_eq!(consumer.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancelled_subscription_stops_consuming() {
    let bus = InMemoryEventBus::with_options(1, fast_policy());
    let consumer = ScriptedConsumer::succeeding();
    let subscription = bus
        .subscribe(
            &[PullReqEventKind::Created],
            consumer.clone(),
            CancellationToken::new(),
        )
        .unwrap();

    subscription.cancel().await;
    bus.publish(created_event()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(consumer.attempts(), 0);
}

#[tokio::test]
async fn closed_bus_rejects_publish() {
    let bus = InMemoryEventBus::new();
    bus.close();
    let err = bus.publish(created_event()).await.unwrap_err();
    assert!(matches!(err, BusError::Closed));
}

#[tokio::test]
async fn worker_pool_processes_multiple_events() {
    let bus = InMemoryEventBus::with_options(4, fast_policy());
    let consumer = ScriptedConsumer::succeeding();
    let subscription = bus
        .subscribe(
            &[PullReqEventKind::Created, PullReqEventKind::Merged],
            consumer.clone(),
            CancellationToken::new(),
        )
        .unwrap();

    for _ in 0..5 {
        bus.publish(created_event()).await.unwrap();
        bus.publish(merged_event()).await.unwrap();
    }

    wait_until(|| consumer.attempts() >= 10).await;
    subscription.cancel().await;

    assert_eq!(consumer.delivered().await.len(), 10);
}
