//! The two-stage base-branch check.
//!
//! Stage one recognizes automated conflict-resolution branches, whose head
//! branch name encodes the target branch alias directly. Stage two resolves
//! an issue number from the pull request and validates the base branch
//! against the branch mapped from the issue's milestone. A run produces at
//! most one failure report.

use anyhow::Result;
use tracing::info;

use crate::alias::conflict_branch_alias;
use crate::capabilities::{IssueNumberResolver, IssueTracker, Reporter};
use crate::context::PullRequestContext;
use crate::policy::BranchPolicy;

/// Final result of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Validates that a pull request targets the base branch its conflict-branch
/// alias or issue milestone says it should.
pub struct BranchValidator<'a> {
    ctx: &'a PullRequestContext,
    policy: &'a BranchPolicy,
    resolver: &'a dyn IssueNumberResolver,
    tracker: &'a dyn IssueTracker,
    reporter: &'a dyn Reporter,
}

impl<'a> BranchValidator<'a> {
    pub fn new(
        ctx: &'a PullRequestContext,
        policy: &'a BranchPolicy,
        resolver: &'a dyn IssueNumberResolver,
        tracker: &'a dyn IssueTracker,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            ctx,
            policy,
            resolver,
            tracker,
            reporter,
        }
    }

    /// Run the check. Milestone validation only runs when the head branch is
    /// not a conflict-resolution branch; a failing verdict is reported
    /// exactly once, before this returns.
    pub async fn run(&self) -> Result<Verdict> {
        let verdict = match self.check_against_branch_name() {
            Some(verdict) => verdict,
            None => self.check_against_issue_milestone().await?,
        };

        if let Verdict::Fail(message) = &verdict {
            self.fail(message).await?;
        }

        Ok(verdict)
    }

    /// Conflict-resolution branches carry the alias of their target branch in
    /// the branch name, bypassing milestone lookup: their "issue" is the
    /// conflict itself, not a tracked feature.
    ///
    /// Returns `None` when the head branch carries no alias.
    fn check_against_branch_name(&self) -> Option<Verdict> {
        info!(
            "Looking for branch alias in PR branch name: {}",
            self.ctx.head_branch
        );

        let alias = conflict_branch_alias(&self.ctx.head_branch)?;

        // An alias that is missing from the policy leaves the expected name
        // empty; the comparison below still fails and reports it.
        let name = self.policy.branch_for_alias(alias).unwrap_or_default();

        if self.ctx.base_branch != name {
            Some(Verdict::Fail(format!(
                "{} This pull request is against the wrong branch. It must be `{}` instead of `{}`",
                self.ctx.author, name, self.ctx.base_branch
            )))
        } else {
            info!(
                "Success: PR base branch '{}' matches PR conflict resolution branch '{}'",
                self.ctx.base_branch, self.ctx.head_branch
            );
            Some(Verdict::Pass)
        }
    }

    /// Validate the base branch against the branch mapped from the milestone
    /// of the issue this pull request references.
    ///
    /// A pull request with no determinable issue passes: absence of a linked
    /// issue is not a policy violation. Resolution failures are treated the
    /// same way; errors from the issue tracker itself propagate.
    async fn check_against_issue_milestone(&self) -> Result<Verdict> {
        let issue_number = match self.resolver.find_issue_number(self.ctx).await {
            Ok(Some(number)) => number,
            Ok(None) => {
                info!(
                    "No issue number found in commit messages, PR title, or branch name. \
                     Skipping milestone validation."
                );
                return Ok(Verdict::Pass);
            }
            Err(err) => {
                info!(
                    "Unable to fetch issue information: {}. Skipping milestone validation.",
                    err
                );
                return Ok(Verdict::Pass);
            }
        };

        info!("Determined issue number is '{}'", issue_number);

        let issue = self.tracker.issue(issue_number).await?;

        let Some(milestone) = issue.milestone else {
            return Ok(Verdict::Fail(format!(
                "Issue #{} is missing a milestone, can't validate the base branch.",
                issue_number
            )));
        };

        match self.policy.branch_for_milestone(milestone.number) {
            None => Ok(Verdict::Fail(format!(
                "{} Did you use the correct issue number in your commit message? \
                 There was no milestone found for #{}",
                self.ctx.author, issue_number
            ))),
            Some(issue_branch) if issue_branch != self.ctx.base_branch => {
                Ok(Verdict::Fail(format!(
                    "{} it looks like this pull request is against the wrong branch. \
                     It should probably be `{}` instead of `{}`",
                    self.ctx.author, issue_branch, self.ctx.base_branch
                )))
            }
            Some(issue_branch) => {
                info!(
                    "Success: PR base branch '{}' matches issue #{} {} branch '{}'",
                    self.ctx.base_branch, issue_number, milestone.title, issue_branch
                );
                Ok(Verdict::Pass)
            }
        }
    }

    /// Report a policy violation: one timeline comment on the pull request
    /// plus a warning on the check run. The comment lands on the PR timeline
    /// rather than the diff because the violation is not tied to a code
    /// location.
    async fn fail(&self, message: &str) -> Result<()> {
        self.reporter.comment(self.ctx.number, message).await?;
        self.reporter.warn(message);
        Ok(())
    }
}
