//! # Delivery Collaborator
//!
//! Interface towards the outbound webhook delivery subsystem. The delivery
//! side matches trigger kind and target repository against configured
//! webhook subscriptions, deduplicates by event id, and performs HTTP
//! delivery with its own retry policy; this layer fires and lets the
//! collaborator own the delivery outcome.

use async_trait::async_trait;
use forgehook_core::events::EventId;
use forgehook_core::Repository;
use tracing::info;

use crate::types::WebhookTrigger;

/// Failure of a delivery handoff.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery subsystem unavailable: {message}")]
    Unavailable { message: String },

    #[error("delivery subsystem rejected the payload: {message}")]
    Rejected { message: String },
}

impl DeliveryError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Handoff interface of the outbound delivery subsystem.
#[async_trait]
pub trait WebhookExecutor: Send + Sync {
    /// Hand an assembled payload to delivery.
    ///
    /// `event_id` is the deduplication key for downstream delivery
    /// tracking; redelivered events arrive here with the same id.
    async fn dispatch(
        &self,
        trigger: WebhookTrigger,
        target_repo: &Repository,
        event_id: &EventId,
        payload: serde_json::Value,
    ) -> Result<(), DeliveryError>;
}

/// Executor that only logs the handoff.
///
/// Stands in for the delivery subsystem in deployments where outbound
/// delivery runs elsewhere.
pub struct LoggingWebhookExecutor;

#[async_trait]
impl WebhookExecutor for LoggingWebhookExecutor {
    async fn dispatch(
        &self,
        trigger: WebhookTrigger,
        target_repo: &Repository,
        event_id: &EventId,
        payload: serde_json::Value,
    ) -> Result<(), DeliveryError> {
        info!(
            trigger = %trigger,
            repo = %target_repo.path,
            event_id = %event_id,
            payload_bytes = payload.to_string().len(),
            "webhook payload handed to delivery"
        );
        Ok(())
    }
}
