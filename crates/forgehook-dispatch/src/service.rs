//! # Trigger Orchestrator
//!
//! The shared routine behind every pull-request event handler: load the
//! entities the event refers to, invoke the handler's payload builder, and
//! hand the assembled payload to the delivery collaborator.

use forgehook_core::events::EventId;
use forgehook_core::git::GitAdapter;
use forgehook_core::store::{PrincipalStore, PullReqStore, RepositoryStore};
use forgehook_core::url::UrlProvider;
use forgehook_core::{Principal, PrincipalId, PullReq, PullReqId, Repository};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::delivery::WebhookExecutor;
use crate::error::TriggerError;
use crate::types::{CommitInfo, WebhookTrigger};

/// Race a lookup against the cancellation token.
///
/// Cancellation wins over a simultaneously completed lookup so a cancelled
/// trigger never proceeds on a stale read.
pub(crate) async fn race_cancel<T, E>(
    cancel: &CancellationToken,
    lookup: impl Future<Output = Result<T, E>>,
) -> Result<T, TriggerError>
where
    TriggerError: From<E>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TriggerError::Cancelled),
        result = lookup => result.map_err(TriggerError::from),
    }
}

/// Shared collaborators and the orchestration routine of the trigger layer.
///
/// Holds read-only handles; safe for concurrent use by any number of
/// in-flight triggers. All durable state lives in the external stores.
pub struct TriggerService {
    pub(crate) principal_store: Arc<dyn PrincipalStore>,
    pub(crate) repo_store: Arc<dyn RepositoryStore>,
    pub(crate) pull_req_store: Arc<dyn PullReqStore>,
    pub(crate) git: Arc<dyn GitAdapter>,
    pub(crate) url_provider: Arc<dyn UrlProvider>,
    pub(crate) executor: Arc<dyn WebhookExecutor>,
}

impl TriggerService {
    pub fn new(
        principal_store: Arc<dyn PrincipalStore>,
        repo_store: Arc<dyn RepositoryStore>,
        pull_req_store: Arc<dyn PullReqStore>,
        git: Arc<dyn GitAdapter>,
        url_provider: Arc<dyn UrlProvider>,
        executor: Arc<dyn WebhookExecutor>,
    ) -> Self {
        Self {
            principal_store,
            repo_store,
            pull_req_store,
            git,
            url_provider,
            executor,
        }
    }

    /// Execute one trigger for a pull-request event.
    ///
    /// Loads principal, pull request, then target and source repositories
    /// sequentially; any lookup failure aborts the whole trigger and no
    /// partial payload is produced. The builder runs only after every
    /// lookup succeeded; its failure (commit resolution, typically) aborts
    /// the trigger with that error. On success the payload is serialized
    /// and handed to the delivery collaborator exactly once. Redelivered
    /// events re-enter here and repeat the full sequence, with dedup by
    /// event id owned downstream.
    ///
    /// The entity reads are independent snapshots against possibly
    /// advancing stores; transient inconsistency between them is accepted.
    pub async fn trigger_for_event_with_pull_req<P, F, Fut>(
        &self,
        trigger: WebhookTrigger,
        event_id: &EventId,
        principal_id: PrincipalId,
        pull_req_id: PullReqId,
        cancel: &CancellationToken,
        build: F,
    ) -> Result<(), TriggerError>
    where
        P: Serialize,
        F: FnOnce(Principal, PullReq, Repository, Repository) -> Fut,
        Fut: Future<Output = Result<P, TriggerError>>,
    {
        let principal = race_cancel(cancel, self.principal_store.find(principal_id)).await?;
        let pr = race_cancel(cancel, self.pull_req_store.find(pull_req_id)).await?;

        let target_repo = race_cancel(cancel, self.repo_store.find(pr.target_repo_id)).await?;
        let source_repo = if pr.source_repo_id == pr.target_repo_id {
            target_repo.clone()
        } else {
            race_cancel(cancel, self.repo_store.find(pr.source_repo_id)).await?
        };

        debug!(
            trigger = %trigger,
            event_id = %event_id,
            pull_req = pr.number,
            repo = %target_repo.path,
            "building webhook payload"
        );

        let payload = build(principal, pr, target_repo.clone(), source_repo).await?;
        let body = serde_json::to_value(&payload)?;

        self.executor
            .dispatch(trigger, &target_repo, event_id, body)
            .await?;

        Ok(())
    }

    /// Resolve commit metadata for a trigger.
    ///
    /// One resolution per call against the git accessor; nothing is cached
    /// across events, so a stale commit is never attached to a payload.
    pub async fn fetch_commit_info(
        &self,
        git_uid: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<CommitInfo, TriggerError> {
        let commit = race_cancel(cancel, self.git.get_commit(git_uid, sha)).await?;
        Ok(CommitInfo::from_commit(&commit))
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
