//! # Dispatch Service
//!
//! The process-wide component subscribed to the event bus. Constructed
//! once at service start with its collaborators injected, it registers one
//! consumer per pull-request lifecycle kind and runs until shutdown, at
//! which point the subscriptions are cancelled and in-flight handler
//! invocations drain.

use async_trait::async_trait;
use forgehook_core::bus::{BusError, ConsumeError, EventBus, EventConsumer, Subscription};
use forgehook_core::events::{Event, PullReqEvent, PullReqEventKind};
use forgehook_core::retry::RedeliveryPolicy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::service::TriggerService;

// ============================================================================
// Configuration
// ============================================================================

/// Tuning of the event consumption side of the dispatch service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Concurrent consumer workers per subscription.
    #[serde(default = "DispatchConfig::default_concurrency")]
    pub concurrency: usize,

    /// Total delivery attempts per event, first delivery included.
    #[serde(default = "DispatchConfig::default_max_delivery_attempts")]
    pub max_delivery_attempts: u32,

    /// Delay before the first redelivery, in milliseconds.
    #[serde(default = "DispatchConfig::default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff cap, in milliseconds.
    #[serde(default = "DispatchConfig::default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl DispatchConfig {
    fn default_concurrency() -> usize {
        4
    }

    fn default_max_delivery_attempts() -> u32 {
        5
    }

    fn default_initial_backoff_ms() -> u64 {
        500
    }

    fn default_max_backoff_ms() -> u64 {
        16_000
    }

    /// Redelivery policy for the bus this service subscribes to.
    pub fn redelivery_policy(&self) -> RedeliveryPolicy {
        RedeliveryPolicy::new(
            self.max_delivery_attempts,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
            2.0,
        )
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: Self::default_concurrency(),
            max_delivery_attempts: Self::default_max_delivery_attempts(),
            initial_backoff_ms: Self::default_initial_backoff_ms(),
            max_backoff_ms: Self::default_max_backoff_ms(),
        }
    }
}

// ============================================================================
// Service
// ============================================================================

/// Bus-facing side of the trigger layer.
///
/// Holds the live subscriptions; no durable in-memory state beyond them.
pub struct DispatchService {
    subscriptions: Vec<Subscription>,
}

impl DispatchService {
    /// Subscribe the trigger layer to every pull-request lifecycle kind.
    ///
    /// Deliveries run under `cancel`; cancelling it aborts in-flight
    /// triggers mid-lookup, which surfaces as a quiet cancellation rather
    /// than a failure.
    pub fn new(
        bus: &dyn EventBus,
        triggers: Arc<TriggerService>,
        cancel: CancellationToken,
    ) -> Result<Self, BusError> {
        let consumer: Arc<dyn EventConsumer> = Arc::new(PullReqConsumer { triggers });

        let mut subscriptions = Vec::with_capacity(PullReqEventKind::ALL.len());
        for kind in PullReqEventKind::ALL {
            subscriptions.push(bus.subscribe(&[kind], Arc::clone(&consumer), cancel.clone())?);
        }

        info!(
            kinds = PullReqEventKind::ALL.len(),
            "dispatch service subscribed to pull-request events"
        );

        Ok(Self { subscriptions })
    }

    /// Cancel the subscriptions and wait for in-flight handlers to drain.
    pub async fn shutdown(self) {
        info!("dispatch service draining subscriptions");
        for subscription in self.subscriptions {
            subscription.cancel().await;
        }
        info!("dispatch service stopped");
    }
}

/// Routes each delivered event to the handler of its kind and classifies
/// the outcome for the bus.
struct PullReqConsumer {
    triggers: Arc<TriggerService>,
}

#[async_trait]
impl EventConsumer for PullReqConsumer {
    async fn consume(
        &self,
        event: &Event<PullReqEvent>,
        cancel: &CancellationToken,
    ) -> Result<(), ConsumeError> {
        let result = match &event.payload {
            PullReqEvent::Created(payload) => {
                self.triggers
                    .handle_pull_req_created(
                        &Event {
                            id: event.id,
                            payload: payload.clone(),
                        },
                        cancel,
                    )
                    .await
            }
            PullReqEvent::Reopened(payload) => {
                self.triggers
                    .handle_pull_req_reopened(
                        &Event {
                            id: event.id,
                            payload: payload.clone(),
                        },
                        cancel,
                    )
                    .await
            }
            PullReqEvent::BranchUpdated(payload) => {
                self.triggers
                    .handle_pull_req_branch_updated(
                        &Event {
                            id: event.id,
                            payload: payload.clone(),
                        },
                        cancel,
                    )
                    .await
            }
            PullReqEvent::Closed(payload) => {
                self.triggers
                    .handle_pull_req_closed(
                        &Event {
                            id: event.id,
                            payload: payload.clone(),
                        },
                        cancel,
                    )
                    .await
            }
            PullReqEvent::Merged(payload) => {
                self.triggers
                    .handle_pull_req_merged(
                        &Event {
                            id: event.id,
                            payload: payload.clone(),
                        },
                        cancel,
                    )
                    .await
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_cancellation() => Err(ConsumeError::Cancelled),
            Err(err) if err.is_not_found() => {
                // The entity disappeared between the event and the trigger;
                // redelivery would fail the same way.
                warn!(
                    event_id = %event.id,
                    kind = %event.payload.kind(),
                    error = %err,
                    "entity referenced by event is gone, dropping trigger"
                );
                Ok(())
            }
            Err(err) if err.is_transient() => Err(ConsumeError::Transient(err.to_string())),
            Err(err) => Err(ConsumeError::Permanent(err.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
