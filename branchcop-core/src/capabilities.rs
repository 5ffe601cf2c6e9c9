//! Capability seams consumed by the validator.
//!
//! The validator takes these as explicit parameters so tests can substitute
//! in-memory fakes; the action binary wires in implementations backed by the
//! GitHub REST API.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::context::PullRequestContext;

/// Milestone attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
}

/// Issue data relevant to branch validation.
#[derive(Debug, Clone)]
pub struct Issue {
    pub number: u64,
    pub milestone: Option<Milestone>,
}

/// Failure while determining which issue a pull request references.
///
/// Distinct from other capability failures: the validator downgrades this to
/// "no linked issue" and passes, instead of aborting the run.
#[derive(Debug, Error)]
#[error("unable to determine a linked issue: {0}")]
pub struct ResolveError(#[from] anyhow::Error);

/// Finds the issue number a pull request references, from commit messages,
/// the PR title, or the branch name. `Ok(None)` means no reference exists.
#[async_trait]
pub trait IssueNumberResolver: Send + Sync {
    async fn find_issue_number(
        &self,
        ctx: &PullRequestContext,
    ) -> Result<Option<u64>, ResolveError>;
}

/// Fetches issue data from the issue tracker.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn issue(&self, number: u64) -> Result<Issue>;
}

/// Reports a policy violation back to the pull request and the check run.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Post a plain timeline comment on the pull request.
    async fn comment(&self, pr_number: u64, body: &str) -> Result<()>;

    /// Mark the check run as warned/failed with the given message.
    fn warn(&self, body: &str);
}
