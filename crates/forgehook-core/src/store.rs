//! # Store Interfaces
//!
//! Read-only collaborator interfaces for the persistent entity stores.
//!
//! The trigger layer fetches principals, repositories, and pull requests by
//! id and never writes them. Implementations are shared, read-mostly, and
//! safe for concurrent use by multiple in-flight triggers.

use crate::{Principal, PrincipalId, PullReq, PullReqId, Repository, RepositoryId};
use async_trait::async_trait;

/// Failure of a store lookup.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("store backend failure: {message}")]
    Backend { message: String },

    #[error("store lookup cancelled")]
    Cancelled,
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Check if the failure is transient and worth a redelivery.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Lookup interface for principals.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find(&self, id: PrincipalId) -> Result<Principal, StoreError>;
}

/// Lookup interface for repositories.
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn find(&self, id: RepositoryId) -> Result<Repository, StoreError>;
}

/// Lookup interface for pull requests.
#[async_trait]
pub trait PullReqStore: Send + Sync {
    async fn find(&self, id: PullReqId) -> Result<PullReq, StoreError>;
}
