//! Issue-number resolution for a pull request.
//!
//! Looks for an issue reference in the PR's commit messages first, then the
//! PR title, then the head-branch name. API failures along the way become
//! `ResolveError`, which the validator treats as "no linked issue".

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use branchcop_core::{IssueNumberResolver, PullRequestContext, ResolveError};

use crate::github::GitHubClient;

static ISSUE_REFERENCE: OnceLock<Regex> = OnceLock::new();
static ISSUE_BRANCH: OnceLock<Regex> = OnceLock::new();

/// First `#<digits>` reference in a free-text message or title.
fn issue_reference(text: &str) -> Option<u64> {
    let pattern = ISSUE_REFERENCE
        .get_or_init(|| Regex::new(r"#(\d+)").expect("issue reference pattern should be valid"));
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|number| number.as_str().parse().ok())
}

/// Issue number encoded in a branch named `issue-<digits>-...`.
fn issue_branch_number(branch: &str) -> Option<u64> {
    let pattern = ISSUE_BRANCH
        .get_or_init(|| Regex::new(r"^issue-(\d+)").expect("issue branch pattern should be valid"));
    pattern
        .captures(branch)
        .and_then(|caps| caps.get(1))
        .and_then(|number| number.as_str().parse().ok())
}

/// Scan the places an issue reference can live, in precedence order: commit
/// messages first, then the PR title, then the head-branch name. The first
/// hit wins.
fn scan_for_issue_number(commit_messages: &[String], title: &str, head_branch: &str) -> Option<u64> {
    for message in commit_messages {
        if let Some(number) = issue_reference(message) {
            info!("Issue reference found in commit message: #{}", number);
            return Some(number);
        }
    }

    if let Some(number) = issue_reference(title) {
        info!("Issue reference found in PR title: #{}", number);
        return Some(number);
    }

    if let Some(number) = issue_branch_number(head_branch) {
        info!("Issue reference found in branch name: #{}", number);
        return Some(number);
    }

    None
}

pub struct CommitScanResolver<'a> {
    client: &'a GitHubClient,
}

impl<'a> CommitScanResolver<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IssueNumberResolver for CommitScanResolver<'_> {
    async fn find_issue_number(
        &self,
        ctx: &PullRequestContext,
    ) -> Result<Option<u64>, ResolveError> {
        let commits = self
            .client
            .list_pull_request_commits(ctx.number)
            .await
            .map_err(ResolveError::from)?;
        let messages: Vec<String> = commits
            .into_iter()
            .map(|entry| entry.commit.message)
            .collect();

        let title = ctx
            .payload
            .get("title")
            .and_then(|title| title.as_str())
            .unwrap_or_default();

        Ok(scan_for_issue_number(&messages, title, &ctx.head_branch))
    }
}
