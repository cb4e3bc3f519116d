//! Tests for the in-memory adapters.

use super::*;
use crate::git::{Identity, Signature};
use crate::{PrincipalKind, PullReqState};
use chrono::Utc;

fn principal(id: i64) -> Principal {
    Principal {
        id: PrincipalId::new(id),
        uid: format!("user-{id}"),
        display_name: "Test User".to_string(),
        email: "user@example.com".to_string(),
        kind: PrincipalKind::User,
        created: Utc::now(),
        updated: Utc::now(),
    }
}

fn repository(id: i64) -> Repository {
    Repository {
        id: RepositoryId::new(id),
        parent_id: None,
        identifier: "project".to_string(),
        path: "space/project".to_string(),
        description: String::new(),
        default_branch: "main".to_string(),
        git_uid: format!("git-{id}"),
        created: Utc::now(),
        updated: Utc::now(),
    }
}

fn pull_req(id: i64) -> PullReq {
    PullReq {
        id: PullReqId::new(id),
        number: id,
        state: PullReqState::Open,
        is_draft: false,
        title: "Add feature".to_string(),
        description: String::new(),
        created_by: PrincipalId::new(1),
        source_repo_id: RepositoryId::new(2),
        source_branch: "feature/x".to_string(),
        target_repo_id: RepositoryId::new(1),
        target_branch: "main".to_string(),
        merge_sha: None,
        created: Utc::now(),
        updated: Utc::now(),
    }
}

fn commit(sha: &str) -> Commit {
    let signature = Signature {
        identity: Identity {
            name: "Author".to_string(),
            email: "author@example.com".to_string(),
        },
        when: Utc::now(),
    };
    Commit {
        sha: sha.to_string(),
        title: "commit title".to_string(),
        message: "commit title\n\nbody".to_string(),
        author: signature.clone(),
        committer: signature,
    }
}

#[tokio::test]
async fn principal_store_finds_seeded_entry() {
    let store = InMemoryPrincipalStore::new();
    store.seed(principal(7));

    let found = store.find(PrincipalId::new(7)).await.unwrap();
    assert_eq!(found.uid, "user-7");
}

#[tokio::test]
async fn principal_store_reports_missing_entry() {
    let store = InMemoryPrincipalStore::new();
    let err = store.find(PrincipalId::new(7)).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_transient());
}

#[tokio::test]
async fn repository_store_round_trip() {
    let store = InMemoryRepositoryStore::new();
    store.seed(repository(1));

    let found = store.find(RepositoryId::new(1)).await.unwrap();
    assert_eq!(found.path, "space/project");
    assert!(store.find(RepositoryId::new(2)).await.is_err());
}

#[tokio::test]
async fn pull_req_store_round_trip() {
    let store = InMemoryPullReqStore::new();
    store.seed(pull_req(42));

    let found = store.find(PullReqId::new(42)).await.unwrap();
    assert_eq!(found.source_branch, "feature/x");
}

#[tokio::test]
async fn git_adapter_resolves_by_repo_identity_and_sha() {
    let git = InMemoryGitAdapter::new();
    git.seed("git-2", commit("abc123"));

    let found = git.get_commit("git-2", "abc123").await.unwrap();
    assert_eq!(found.sha, "abc123");

    // Same SHA under a different repository identity stays unresolved.
    let err = git.get_commit("git-1", "abc123").await.unwrap_err();
    assert!(err.is_not_found());
}
