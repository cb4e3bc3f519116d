//! # In-Memory Stores
//!
//! Thread-safe in-memory implementations of the store and git accessor
//! interfaces. Entities are seeded up front; lookups behave exactly like
//! the production stores at the interface (found, not found).

use crate::git::{Commit, GitAdapter, GitError};
use crate::store::{PrincipalStore, PullReqStore, RepositoryStore, StoreError};
use crate::{Principal, PrincipalId, PullReq, PullReqId, Repository, RepositoryId};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

/// In-memory principal store.
#[derive(Clone, Default)]
pub struct InMemoryPrincipalStore {
    items: Arc<RwLock<HashMap<PrincipalId, Principal>>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, principal: Principal) {
        self.items.write().unwrap().insert(principal.id, principal);
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn find(&self, id: PrincipalId) -> Result<Principal, StoreError> {
        self.items
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("principal", id.value()))
    }
}

/// In-memory repository store.
#[derive(Clone, Default)]
pub struct InMemoryRepositoryStore {
    items: Arc<RwLock<HashMap<RepositoryId, Repository>>>,
}

impl InMemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, repository: Repository) {
        self.items
            .write()
            .unwrap()
            .insert(repository.id, repository);
    }
}

#[async_trait]
impl RepositoryStore for InMemoryRepositoryStore {
    async fn find(&self, id: RepositoryId) -> Result<Repository, StoreError> {
        self.items
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("repository", id.value()))
    }
}

/// In-memory pull-request store.
#[derive(Clone, Default)]
pub struct InMemoryPullReqStore {
    items: Arc<RwLock<HashMap<PullReqId, PullReq>>>,
}

impl InMemoryPullReqStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, pull_req: PullReq) {
        self.items.write().unwrap().insert(pull_req.id, pull_req);
    }
}

#[async_trait]
impl PullReqStore for InMemoryPullReqStore {
    async fn find(&self, id: PullReqId) -> Result<PullReq, StoreError> {
        self.items
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("pull request", id.value()))
    }
}

/// In-memory git accessor keyed by `(git_uid, sha)`.
#[derive(Clone, Default)]
pub struct InMemoryGitAdapter {
    commits: Arc<RwLock<HashMap<(String, String), Commit>>>,
}

impl InMemoryGitAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, git_uid: &str, commit: Commit) {
        self.commits
            .write()
            .unwrap()
            .insert((git_uid.to_string(), commit.sha.clone()), commit);
    }
}

#[async_trait]
impl GitAdapter for InMemoryGitAdapter {
    async fn get_commit(&self, git_uid: &str, sha: &str) -> Result<Commit, GitError> {
        self.commits
            .read()
            .unwrap()
            .get(&(git_uid.to_string(), sha.to_string()))
            .cloned()
            .ok_or_else(|| GitError::commit_not_found(sha))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
