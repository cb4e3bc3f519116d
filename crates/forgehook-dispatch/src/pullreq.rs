//! # Pull-Request Event Handlers
//!
//! One handler per pull-request lifecycle kind. Each handler is a thin
//! adapter: it extracts the acting principal and pull request from the
//! event, picks the SHA(s) to resolve, and supplies the payload builder
//! the orchestrator invokes once every entity lookup succeeded.

use forgehook_core::events::{
    Event, PullReqBranchUpdated, PullReqClosed, PullReqCreated, PullReqMerged, PullReqReopened,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::TriggerError;
use crate::service::TriggerService;
use crate::types::{
    branch_reference, BaseSegment, PrincipalInfo, PullReqInfo, PullReqSegment,
    ReferenceDetailsSegment, ReferenceInfo, ReferenceSegment, ReferenceUpdateSegment,
    RepositoryInfo, TargetReferenceSegment, WebhookTrigger,
};

/// Body of the pullreq created trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqCreatedPayload {
    #[serde(flatten)]
    pub base: BaseSegment,
    #[serde(flatten)]
    pub pull_req: PullReqSegment,
    #[serde(flatten)]
    pub target_reference: TargetReferenceSegment,
    #[serde(flatten)]
    pub reference: ReferenceSegment,
    #[serde(flatten)]
    pub reference_details: ReferenceDetailsSegment,
}

/// Body of the pullreq reopened trigger.
///
/// Field set matches [`PullReqCreatedPayload`]; the `trigger` value inside
/// the base segment is what subscribers discriminate on. Kept as its own
/// type so the two payloads stay independently versionable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqReopenedPayload {
    #[serde(flatten)]
    pub base: BaseSegment,
    #[serde(flatten)]
    pub pull_req: PullReqSegment,
    #[serde(flatten)]
    pub target_reference: TargetReferenceSegment,
    #[serde(flatten)]
    pub reference: ReferenceSegment,
    #[serde(flatten)]
    pub reference_details: ReferenceDetailsSegment,
}

/// Body of the pullreq branch updated trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqBranchUpdatedPayload {
    #[serde(flatten)]
    pub base: BaseSegment,
    #[serde(flatten)]
    pub pull_req: PullReqSegment,
    #[serde(flatten)]
    pub target_reference: TargetReferenceSegment,
    #[serde(flatten)]
    pub reference: ReferenceSegment,
    #[serde(flatten)]
    pub reference_details: ReferenceDetailsSegment,
    #[serde(flatten)]
    pub reference_update: ReferenceUpdateSegment,
}

/// Body of the pullreq closed trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqClosedPayload {
    #[serde(flatten)]
    pub base: BaseSegment,
    #[serde(flatten)]
    pub pull_req: PullReqSegment,
    #[serde(flatten)]
    pub target_reference: TargetReferenceSegment,
    #[serde(flatten)]
    pub reference: ReferenceSegment,
    #[serde(flatten)]
    pub reference_details: ReferenceDetailsSegment,
}

/// Body of the pullreq merged trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReqMergedPayload {
    #[serde(flatten)]
    pub base: BaseSegment,
    #[serde(flatten)]
    pub pull_req: PullReqSegment,
    #[serde(flatten)]
    pub target_reference: TargetReferenceSegment,
    #[serde(flatten)]
    pub reference: ReferenceSegment,
    #[serde(flatten)]
    pub reference_details: ReferenceDetailsSegment,
}

impl TriggerService {
    /// Handle created events for pull requests and trigger pullreq created
    /// webhooks for the target repo.
    pub async fn handle_pull_req_created(
        &self,
        event: &Event<PullReqCreated>,
        cancel: &CancellationToken,
    ) -> Result<(), TriggerError> {
        self.trigger_for_event_with_pull_req(
            WebhookTrigger::PullReqCreated,
            &event.id,
            event.payload.principal_id,
            event.payload.pull_req_id,
            cancel,
            |principal, pr, target_repo, source_repo| async move {
                let commit = self
                    .fetch_commit_info(&source_repo.git_uid, &event.payload.source_sha, cancel)
                    .await?;
                let target_repo_info =
                    RepositoryInfo::from_repository(&target_repo, self.url_provider.as_ref());
                let source_repo_info =
                    RepositoryInfo::from_repository(&source_repo, self.url_provider.as_ref());

                Ok(PullReqCreatedPayload {
                    base: BaseSegment {
                        trigger: WebhookTrigger::PullReqCreated,
                        repo: target_repo_info.clone(),
                        principal: PrincipalInfo::from_principal(&principal),
                    },
                    pull_req: PullReqSegment {
                        pull_req: PullReqInfo::from_pull_req(&pr),
                    },
                    target_reference: TargetReferenceSegment {
                        target_ref: ReferenceInfo {
                            name: branch_reference(&pr.target_branch),
                            repo: target_repo_info,
                        },
                    },
                    reference: ReferenceSegment {
                        reference: ReferenceInfo {
                            name: branch_reference(&pr.source_branch),
                            repo: source_repo_info,
                        },
                    },
                    reference_details: ReferenceDetailsSegment {
                        sha: event.payload.source_sha.clone(),
                        commit,
                    },
                })
            },
        )
        .await
    }

    /// Handle reopened events for pull requests and trigger pullreq
    /// reopened webhooks for the target repo.
    pub async fn handle_pull_req_reopened(
        &self,
        event: &Event<PullReqReopened>,
        cancel: &CancellationToken,
    ) -> Result<(), TriggerError> {
        self.trigger_for_event_with_pull_req(
            WebhookTrigger::PullReqReopened,
            &event.id,
            event.payload.principal_id,
            event.payload.pull_req_id,
            cancel,
            |principal, pr, target_repo, source_repo| async move {
                let commit = self
                    .fetch_commit_info(&source_repo.git_uid, &event.payload.source_sha, cancel)
                    .await?;
                let target_repo_info =
                    RepositoryInfo::from_repository(&target_repo, self.url_provider.as_ref());
                let source_repo_info =
                    RepositoryInfo::from_repository(&source_repo, self.url_provider.as_ref());

                Ok(PullReqReopenedPayload {
                    base: BaseSegment {
                        trigger: WebhookTrigger::PullReqReopened,
                        repo: target_repo_info.clone(),
                        principal: PrincipalInfo::from_principal(&principal),
                    },
                    pull_req: PullReqSegment {
                        pull_req: PullReqInfo::from_pull_req(&pr),
                    },
                    target_reference: TargetReferenceSegment {
                        target_ref: ReferenceInfo {
                            name: branch_reference(&pr.target_branch),
                            repo: target_repo_info,
                        },
                    },
                    reference: ReferenceSegment {
                        reference: ReferenceInfo {
                            name: branch_reference(&pr.source_branch),
                            repo: source_repo_info,
                        },
                    },
                    reference_details: ReferenceDetailsSegment {
                        sha: event.payload.source_sha.clone(),
                        commit,
                    },
                })
            },
        )
        .await
    }

    /// Handle branch updated events for pull requests and trigger pullreq
    /// branch updated webhooks for the target repo.
    ///
    /// Resolves the event's new SHA; the old SHA only travels in the
    /// reference-update segment.
    pub async fn handle_pull_req_branch_updated(
        &self,
        event: &Event<PullReqBranchUpdated>,
        cancel: &CancellationToken,
    ) -> Result<(), TriggerError> {
        self.trigger_for_event_with_pull_req(
            WebhookTrigger::PullReqBranchUpdated,
            &event.id,
            event.payload.principal_id,
            event.payload.pull_req_id,
            cancel,
            |principal, pr, target_repo, source_repo| async move {
                let commit = self
                    .fetch_commit_info(&source_repo.git_uid, &event.payload.new_sha, cancel)
                    .await?;
                let target_repo_info =
                    RepositoryInfo::from_repository(&target_repo, self.url_provider.as_ref());
                let source_repo_info =
                    RepositoryInfo::from_repository(&source_repo, self.url_provider.as_ref());

                Ok(PullReqBranchUpdatedPayload {
                    base: BaseSegment {
                        trigger: WebhookTrigger::PullReqBranchUpdated,
                        repo: target_repo_info.clone(),
                        principal: PrincipalInfo::from_principal(&principal),
                    },
                    pull_req: PullReqSegment {
                        pull_req: PullReqInfo::from_pull_req(&pr),
                    },
                    target_reference: TargetReferenceSegment {
                        target_ref: ReferenceInfo {
                            name: branch_reference(&pr.target_branch),
                            repo: target_repo_info,
                        },
                    },
                    reference: ReferenceSegment {
                        reference: ReferenceInfo {
                            name: branch_reference(&pr.source_branch),
                            repo: source_repo_info,
                        },
                    },
                    reference_details: ReferenceDetailsSegment {
                        sha: event.payload.new_sha.clone(),
                        commit,
                    },
                    reference_update: ReferenceUpdateSegment {
                        old_sha: event.payload.old_sha.clone(),
                        forced: event.payload.forced,
                    },
                })
            },
        )
        .await
    }

    /// Handle closed events for pull requests and trigger pullreq closed
    /// webhooks for the target repo.
    pub async fn handle_pull_req_closed(
        &self,
        event: &Event<PullReqClosed>,
        cancel: &CancellationToken,
    ) -> Result<(), TriggerError> {
        self.trigger_for_event_with_pull_req(
            WebhookTrigger::PullReqClosed,
            &event.id,
            event.payload.principal_id,
            event.payload.pull_req_id,
            cancel,
            |principal, pr, target_repo, source_repo| async move {
                let commit = self
                    .fetch_commit_info(&source_repo.git_uid, &event.payload.source_sha, cancel)
                    .await?;
                let target_repo_info =
                    RepositoryInfo::from_repository(&target_repo, self.url_provider.as_ref());
                let source_repo_info =
                    RepositoryInfo::from_repository(&source_repo, self.url_provider.as_ref());

                Ok(PullReqClosedPayload {
                    base: BaseSegment {
                        trigger: WebhookTrigger::PullReqClosed,
                        repo: target_repo_info.clone(),
                        principal: PrincipalInfo::from_principal(&principal),
                    },
                    pull_req: PullReqSegment {
                        pull_req: PullReqInfo::from_pull_req(&pr),
                    },
                    target_reference: TargetReferenceSegment {
                        target_ref: ReferenceInfo {
                            name: branch_reference(&pr.target_branch),
                            repo: target_repo_info,
                        },
                    },
                    reference: ReferenceSegment {
                        reference: ReferenceInfo {
                            name: branch_reference(&pr.source_branch),
                            repo: source_repo_info,
                        },
                    },
                    reference_details: ReferenceDetailsSegment {
                        sha: event.payload.source_sha.clone(),
                        commit,
                    },
                })
            },
        )
        .await
    }

    /// Handle merged events for pull requests and trigger pullreq merged
    /// webhooks for the target repo.
    ///
    /// The merge commit exists only in the target repository, so it is
    /// resolved against the target repository's git identity.
    pub async fn handle_pull_req_merged(
        &self,
        event: &Event<PullReqMerged>,
        cancel: &CancellationToken,
    ) -> Result<(), TriggerError> {
        self.trigger_for_event_with_pull_req(
            WebhookTrigger::PullReqMerged,
            &event.id,
            event.payload.principal_id,
            event.payload.pull_req_id,
            cancel,
            |principal, pr, target_repo, source_repo| async move {
                let commit = self
                    .fetch_commit_info(&target_repo.git_uid, &event.payload.merge_sha, cancel)
                    .await?;
                let target_repo_info =
                    RepositoryInfo::from_repository(&target_repo, self.url_provider.as_ref());
                let source_repo_info =
                    RepositoryInfo::from_repository(&source_repo, self.url_provider.as_ref());

                Ok(PullReqMergedPayload {
                    base: BaseSegment {
                        trigger: WebhookTrigger::PullReqMerged,
                        repo: target_repo_info.clone(),
                        principal: PrincipalInfo::from_principal(&principal),
                    },
                    pull_req: PullReqSegment {
                        pull_req: PullReqInfo::from_pull_req(&pr),
                    },
                    target_reference: TargetReferenceSegment {
                        target_ref: ReferenceInfo {
                            name: branch_reference(&pr.target_branch),
                            repo: target_repo_info,
                        },
                    },
                    reference: ReferenceSegment {
                        reference: ReferenceInfo {
                            name: branch_reference(&pr.source_branch),
                            repo: source_repo_info,
                        },
                    },
                    reference_details: ReferenceDetailsSegment {
                        sha: event.payload.merge_sha.clone(),
                        commit,
                    },
                })
            },
        )
        .await
    }
}

#[cfg(test)]
#[path = "pullreq_tests.rs"]
mod tests;
