//! # Git Data Accessor
//!
//! Interface towards the git backend for resolving commit metadata.
//!
//! Commits are resolved lazily per event and never cached across events so
//! a stale commit is never attached to a payload.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author or committer identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Identity plus the moment the identity acted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub identity: Identity,
    pub when: DateTime<Utc>,
}

/// Commit metadata as resolved by the git backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub title: String,
    pub message: String,
    pub author: Signature,
    pub committer: Signature,
}

/// Failure of a commit resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GitError {
    #[error("commit {sha} not found")]
    CommitNotFound { sha: String },

    #[error("git backend failure: {message}")]
    Backend { message: String },

    #[error("commit resolution cancelled")]
    Cancelled,
}

impl GitError {
    pub fn commit_not_found(sha: impl Into<String>) -> Self {
        Self::CommitNotFound { sha: sha.into() }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CommitNotFound { .. })
    }
}

/// Interface for resolving commits from a repository's git identity.
///
/// A single synchronous resolution per call; no caching, no retries.
#[async_trait]
pub trait GitAdapter: Send + Sync {
    async fn get_commit(&self, git_uid: &str, sha: &str) -> Result<Commit, GitError>;
}
