//! # Trigger Errors
//!
//! Failure taxonomy of one trigger execution. The classification helpers
//! drive the consumer's decision between dropping an event (data
//! consistency issue), surfacing it for bus redelivery (transient backend
//! trouble), and aborting quietly (cancellation).

use forgehook_core::git::GitError;
use forgehook_core::store::StoreError;

use crate::delivery::DeliveryError;

/// Failure of a single trigger execution.
///
/// Every lookup failure short-circuits the orchestrator; no partial
/// payload is ever handed to delivery.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("store lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("commit resolution failed: {0}")]
    Git(#[from] GitError),

    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("delivery handoff failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("trigger cancelled")]
    Cancelled,
}

impl TriggerError {
    /// The trigger was aborted by context cancellation, not by a failure.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Store(err) => matches!(err, StoreError::Cancelled),
            Self::Git(err) => matches!(err, GitError::Cancelled),
            _ => false,
        }
    }

    /// An entity or commit referenced by the event no longer exists.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Store(err) => err.is_not_found(),
            Self::Git(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Worth a bus redelivery.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Store(err) => err.is_transient(),
            Self::Git(err) => err.is_transient(),
            Self::Delivery(err) => err.is_transient(),
            Self::Serialization(_) => false,
            Self::Cancelled => false,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
