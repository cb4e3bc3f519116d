//! # Forgehook Core
//!
//! Domain model and collaborator interfaces for the Forgehook webhook
//! triggering service.
//!
//! This crate contains the entities the trigger layer reads (principals,
//! repositories, pull requests, commits), the trait abstractions for the
//! external stores and the git data accessor, the pull-request domain-event
//! model, and the event-bus abstraction the dispatch layer subscribes to.
//!
//! ## Architecture
//!
//! The trigger layer depends only on the trait abstractions defined here;
//! infrastructure implementations are injected at startup. The in-memory
//! adapters under [`adapters`] exist for development wiring and tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Domain Identifier Types
// ============================================================================

/// Database identifier of a principal (user, service, or service account).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(i64);

impl PrincipalId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId(i64);

impl RepositoryId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullReqId(i64);

impl PullReqId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PullReqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Domain Entities
// ============================================================================

/// Kind of acting principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    User,
    Service,
    ServiceAccount,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Service => "service",
            Self::ServiceAccount => "service_account",
        }
    }
}

/// An acting principal as stored by the principal store.
///
/// The trigger layer only ever reads principals; mutation is owned by the
/// account subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub kind: PrincipalKind,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// A hosted repository as stored by the repository store.
///
/// `git_uid` is the repository's identity towards the git data accessor and
/// is unrelated to its display path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepositoryId,
    pub parent_id: Option<RepositoryId>,
    pub identifier: String,
    pub path: String,
    pub description: String,
    pub default_branch: String,
    pub git_uid: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullReqState {
    Open,
    Closed,
    Merged,
}

impl PullReqState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }
}

/// A pull request as stored by the pull-request store.
///
/// Source and target repository ids differ for fork-based flows, so the two
/// repositories are always looked up independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReq {
    pub id: PullReqId,
    pub number: i64,
    pub state: PullReqState,
    pub is_draft: bool,
    pub title: String,
    pub description: String,
    pub created_by: PrincipalId,
    pub source_repo_id: RepositoryId,
    pub source_branch: String,
    pub target_repo_id: RepositoryId,
    pub target_branch: String,
    pub merge_sha: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

// ============================================================================
// Module declarations
// ============================================================================

/// Store collaborator interfaces for principals, repositories, and pull requests.
pub mod store;

/// Git data accessor interface for commit resolution.
pub mod git;

/// URL provider interface for building absolute repository links.
pub mod url;

/// Pull-request domain-event model.
pub mod events;

/// Event bus abstraction and in-memory adapter.
pub mod bus;

/// Redelivery backoff policy for the in-memory bus.
pub mod retry;

/// In-memory store and git adapters for development and tests.
pub mod adapters;

// Re-export key types for convenience
pub use bus::{BusError, ConsumeError, EventBus, EventConsumer, InMemoryEventBus, Subscription};
pub use events::{Event, EventId, PullReqEvent, PullReqEventKind};
pub use git::{Commit, GitAdapter, GitError, Identity, Signature};
pub use retry::RedeliveryPolicy;
pub use store::{PrincipalStore, PullReqStore, RepositoryStore, StoreError};
pub use url::{BaseUrlProvider, UrlError, UrlProvider};
