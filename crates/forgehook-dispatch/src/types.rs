//! # Webhook Trigger Types
//!
//! The trigger enumeration, the payload segments every trigger-specific
//! payload is composed from, and the pure projections that turn internal
//! entities into their public, stable-shape representations.
//!
//! Segment composition is additive and order-stable per trigger kind: two
//! events of the same kind always produce payloads with structurally
//! identical segment sets, differing only in field values.

use chrono::{DateTime, Utc};
use forgehook_core::git::Commit;
use forgehook_core::url::UrlProvider;
use forgehook_core::{
    Principal, PrincipalId, PrincipalKind, PullReq, PullReqState, Repository, RepositoryId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of git references of type branch.
///
/// Reference names inside payloads always carry this prefix; a bare branch
/// name is never emitted.
pub const GIT_REFERENCE_NAME_PREFIX_BRANCH: &str = "refs/heads/";

/// Apply the branch-reference namespace to a branch name.
pub fn branch_reference(branch: &str) -> String {
    format!("{GIT_REFERENCE_NAME_PREFIX_BRANCH}{branch}")
}

// ============================================================================
// Trigger Enumeration
// ============================================================================

/// Enumerated reason a webhook fires.
///
/// Wire names form a closed, versioned set subscribers pattern-match on.
/// A new lifecycle kind adds a value here; existing values are never
/// renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookTrigger {
    #[serde(rename = "pullreq_created")]
    PullReqCreated,
    #[serde(rename = "pullreq_reopened")]
    PullReqReopened,
    #[serde(rename = "pullreq_branch_updated")]
    PullReqBranchUpdated,
    #[serde(rename = "pullreq_closed")]
    PullReqClosed,
    #[serde(rename = "pullreq_merged")]
    PullReqMerged,
}

impl WebhookTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PullReqCreated => "pullreq_created",
            Self::PullReqReopened => "pullreq_reopened",
            Self::PullReqBranchUpdated => "pullreq_branch_updated",
            Self::PullReqClosed => "pullreq_closed",
            Self::PullReqMerged => "pullreq_merged",
        }
    }
}

impl fmt::Display for WebhookTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Projection Types
// ============================================================================

/// Public representation of a repository inside payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub id: RepositoryId,
    pub path: String,
    pub identifier: String,
    pub default_branch: String,
    pub git_url: String,
}

impl RepositoryInfo {
    /// Project a repository, building its absolute clone link through the
    /// URL provider.
    pub fn from_repository(repo: &Repository, urls: &dyn UrlProvider) -> Self {
        Self {
            id: repo.id,
            path: repo.path.clone(),
            identifier: repo.identifier.clone(),
            default_branch: repo.default_branch.clone(),
            git_url: urls.git_clone_url(&repo.path),
        }
    }
}

/// Public representation of a principal inside payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipalInfo {
    pub id: PrincipalId,
    pub uid: String,
    pub display_name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: PrincipalKind,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl PrincipalInfo {
    pub fn from_principal(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            uid: principal.uid.clone(),
            display_name: principal.display_name.clone(),
            email: principal.email.clone(),
            kind: principal.kind,
            created: principal.created,
            updated: principal.updated,
        }
    }
}

/// Public representation of a pull request inside payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqInfo {
    pub number: i64,
    pub state: PullReqState,
    pub is_draft: bool,
    pub title: String,
    pub source_repo_id: RepositoryId,
    pub source_branch: String,
    pub target_repo_id: RepositoryId,
    pub target_branch: String,
}

impl PullReqInfo {
    pub fn from_pull_req(pr: &PullReq) -> Self {
        Self {
            number: pr.number,
            state: pr.state,
            is_draft: pr.is_draft,
            title: pr.title.clone(),
            source_repo_id: pr.source_repo_id,
            source_branch: pr.source_branch.clone(),
            target_repo_id: pr.target_repo_id,
            target_branch: pr.target_branch.clone(),
        }
    }
}

/// Identity of a commit author or committer inside payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityInfo {
    pub name: String,
    pub email: String,
}

/// Identity plus timestamp inside payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub identity: IdentityInfo,
    pub when: DateTime<Utc>,
}

/// Public representation of a commit inside payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    pub author: SignatureInfo,
    pub committer: SignatureInfo,
}

impl CommitInfo {
    pub fn from_commit(commit: &Commit) -> Self {
        Self {
            sha: commit.sha.clone(),
            message: commit.message.clone(),
            author: SignatureInfo {
                identity: IdentityInfo {
                    name: commit.author.identity.name.clone(),
                    email: commit.author.identity.email.clone(),
                },
                when: commit.author.when,
            },
            committer: SignatureInfo {
                identity: IdentityInfo {
                    name: commit.committer.identity.name.clone(),
                    email: commit.committer.identity.email.clone(),
                },
                when: commit.committer.when,
            },
        }
    }
}

/// A named git reference scoped to the repository the branch lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceInfo {
    pub name: String,
    pub repo: RepositoryInfo,
}

// ============================================================================
// Payload Segments
// ============================================================================

/// Common trigger information present in every payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSegment {
    pub trigger: WebhookTrigger,
    pub repo: RepositoryInfo,
    pub principal: PrincipalInfo,
}

/// Pull-request information present in every pull-request trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqSegment {
    pub pull_req: PullReqInfo,
}

/// The pull request's target reference, scoped to the target repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetReferenceSegment {
    pub target_ref: ReferenceInfo,
}

/// The pull request's source/head reference, scoped to the source
/// repository (a different one for fork flows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSegment {
    #[serde(rename = "ref")]
    pub reference: ReferenceInfo,
}

/// Resolved commit details of the reference the trigger is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDetailsSegment {
    pub sha: String,
    pub commit: CommitInfo,
}

/// Delta of a reference update; branch-updated triggers only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceUpdateSegment {
    pub old_sha: String,
    pub forced: bool,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
