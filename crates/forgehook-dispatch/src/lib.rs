//! # Forgehook Dispatch
//!
//! The trigger layer of the webhook subsystem: consumes pull-request
//! lifecycle events from the event bus, enriches them with repository,
//! principal, and commit metadata, and hands a strongly-typed payload to
//! the outbound webhook delivery subsystem.
//!
//! ## Pipeline
//!
//! event bus → [`DispatchService`] → per-kind handler on
//! [`TriggerService`] → orchestrated entity lookups → payload assembly →
//! handoff to the [`WebhookExecutor`] collaborator, keyed by trigger kind
//! and target repository.
//!
//! The pipeline makes exactly one handoff attempt per invocation. Bus
//! redelivery re-executes the whole lookup/build/handoff sequence from
//! scratch; deduplication by event id is owned by the delivery
//! collaborator.

/// Trigger error taxonomy.
pub mod error;

/// Trigger enumeration, payload segments, and metadata projections.
pub mod types;

/// Delivery collaborator interface.
pub mod delivery;

/// Trigger orchestrator.
pub mod service;

/// Pull-request payload types and event handlers.
pub mod pullreq;

/// Process-wide dispatch service subscribed to the event bus.
pub mod dispatch;

// Re-export key types for convenience
pub use delivery::{DeliveryError, LoggingWebhookExecutor, WebhookExecutor};
pub use dispatch::{DispatchConfig, DispatchService};
pub use error::TriggerError;
pub use pullreq::{
    PullReqBranchUpdatedPayload, PullReqClosedPayload, PullReqCreatedPayload,
    PullReqMergedPayload, PullReqReopenedPayload,
};
pub use service::TriggerService;
pub use types::{
    BaseSegment, CommitInfo, IdentityInfo, PrincipalInfo, PullReqInfo, PullReqSegment,
    ReferenceDetailsSegment, ReferenceInfo, ReferenceSegment, ReferenceUpdateSegment,
    RepositoryInfo, SignatureInfo, TargetReferenceSegment, WebhookTrigger,
};
