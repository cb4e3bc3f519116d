//! # Pull-Request Domain Events
//!
//! The closed set of pull-request lifecycle events published on the event
//! bus, plus the event envelope and its globally unique identifier.

use crate::{PrincipalId, PullReqId};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Globally unique identifier of a published domain event.
///
/// Uses ULID for lexicographic sorting. Downstream delivery tracking uses
/// this id as its idempotency/dedup key; this layer only carries it along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Ulid);

impl EventId {
    /// Generate a new unique event id.
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Envelope around a published domain-event payload.
///
/// Immutable once published; redelivery reuses the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event<P> {
    pub id: EventId,
    pub payload: P,
}

// ============================================================================
// Event Payloads
// ============================================================================

/// A pull request was opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqCreated {
    pub principal_id: PrincipalId,
    pub pull_req_id: PullReqId,
    pub source_sha: String,
}

/// A closed pull request was reopened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqReopened {
    pub principal_id: PrincipalId,
    pub pull_req_id: PullReqId,
    pub source_sha: String,
}

/// The source branch of an open pull request moved to a new commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqBranchUpdated {
    pub principal_id: PrincipalId,
    pub pull_req_id: PullReqId,
    pub old_sha: String,
    pub new_sha: String,
    pub forced: bool,
}

/// A pull request was closed without merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqClosed {
    pub principal_id: PrincipalId,
    pub pull_req_id: PullReqId,
    pub source_sha: String,
}

/// A pull request was merged into its target branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqMerged {
    pub principal_id: PrincipalId,
    pub pull_req_id: PullReqId,
    pub merge_sha: String,
}

/// Tagged union over every pull-request lifecycle event payload.
///
/// Adding a lifecycle kind means adding a variant here and a handler in the
/// dispatch layer; existing variants are never renamed, so subscribers keep
/// pattern-matching on stable wire names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PullReqEvent {
    Created(PullReqCreated),
    Reopened(PullReqReopened),
    BranchUpdated(PullReqBranchUpdated),
    Closed(PullReqClosed),
    Merged(PullReqMerged),
}

impl PullReqEvent {
    pub fn kind(&self) -> PullReqEventKind {
        match self {
            Self::Created(_) => PullReqEventKind::Created,
            Self::Reopened(_) => PullReqEventKind::Reopened,
            Self::BranchUpdated(_) => PullReqEventKind::BranchUpdated,
            Self::Closed(_) => PullReqEventKind::Closed,
            Self::Merged(_) => PullReqEventKind::Merged,
        }
    }
}

/// Discriminator for [`PullReqEvent`] variants, used for subscription
/// filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullReqEventKind {
    Created,
    Reopened,
    BranchUpdated,
    Closed,
    Merged,
}

impl PullReqEventKind {
    /// Every lifecycle kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Created,
        Self::Reopened,
        Self::BranchUpdated,
        Self::Closed,
        Self::Merged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "pullreq_created",
            Self::Reopened => "pullreq_reopened",
            Self::BranchUpdated => "pullreq_branch_updated",
            Self::Closed => "pullreq_closed",
            Self::Merged => "pullreq_merged",
        }
    }
}

impl fmt::Display for PullReqEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
