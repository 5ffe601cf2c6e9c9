//! End-to-end runs of the validator against in-memory capabilities.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;

use branchcop_core::{
    BranchPolicy, BranchValidator, Issue, IssueNumberResolver, IssueTracker, Milestone,
    PullRequestContext, Reporter, ResolveError, Verdict,
};

enum Resolution {
    Found(u64),
    NotFound,
    Error,
}

struct FakeResolver {
    resolution: Resolution,
    calls: AtomicUsize,
}

impl FakeResolver {
    fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IssueNumberResolver for FakeResolver {
    async fn find_issue_number(
        &self,
        _ctx: &PullRequestContext,
    ) -> Result<Option<u64>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.resolution {
            Resolution::Found(number) => Ok(Some(number)),
            Resolution::NotFound => Ok(None),
            Resolution::Error => Err(ResolveError::from(anyhow!("pull request not accessible"))),
        }
    }
}

struct FakeTracker {
    milestone: Option<Milestone>,
    calls: AtomicUsize,
}

impl FakeTracker {
    fn new(milestone: Option<Milestone>) -> Self {
        Self {
            milestone,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn issue(&self, number: u64) -> Result<Issue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Issue {
            number,
            milestone: self.milestone.clone(),
        })
    }
}

/// Tracker whose backing API is down; used to check that fetch errors are not
/// swallowed the way resolution errors are.
struct BrokenTracker;

#[async_trait]
impl IssueTracker for BrokenTracker {
    async fn issue(&self, _number: u64) -> Result<Issue> {
        Err(anyhow!("GitHub API error: 500 - upstream unavailable"))
    }
}

#[derive(Default)]
struct RecordingReporter {
    comments: Mutex<Vec<(u64, String)>>,
    warnings: Mutex<Vec<String>>,
}

impl RecordingReporter {
    fn comments(&self) -> Vec<(u64, String)> {
        self.comments.lock().unwrap().clone()
    }

    fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    async fn comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.comments
            .lock()
            .unwrap()
            .push((pr_number, body.to_string()));
        Ok(())
    }

    fn warn(&self, body: &str) {
        self.warnings.lock().unwrap().push(body.to_string());
    }
}

fn context(base_branch: &str, head_branch: &str) -> PullRequestContext {
    PullRequestContext {
        base_branch: base_branch.to_string(),
        head_branch: head_branch.to_string(),
        author: "@joe".to_string(),
        number: 1,
        payload: json!({}),
    }
}

fn policy() -> BranchPolicy {
    BranchPolicy::from_json(
        r#"{
            "branchByAlias": {
                "2021-sp": { "name": "release-2021-commercial-sp" }
            },
            "branchNameByMilestoneNumber": {
                "7": "release-2020-commercial"
            }
        }"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_fail_from_branch_name() {
    let ctx = context("release-2022", "issue-44915-pr-44995-conflicts-2021-sp");
    let policy = policy();
    let resolver = FakeResolver::new(Resolution::NotFound);
    let tracker = FakeTracker::new(None);
    let reporter = RecordingReporter::default();

    let verdict = BranchValidator::new(&ctx, &policy, &resolver, &tracker, &reporter)
        .run()
        .await
        .unwrap();

    let expected = "@joe This pull request is against the wrong branch. \
                    It must be `release-2021-commercial-sp` instead of `release-2022`";
    assert_eq!(verdict, Verdict::Fail(expected.to_string()));
    assert_eq!(reporter.comments(), vec![(1, expected.to_string())]);
    assert_eq!(reporter.warnings(), vec![expected.to_string()]);

    // Milestone validation never runs for a conflict-resolution branch
    assert_eq!(resolver.calls(), 0);
    assert_eq!(tracker.calls(), 0);
}

#[tokio::test]
async fn test_pass_from_branch_name() {
    let ctx = context(
        "release-2021-commercial-sp",
        "issue-44915-pr-44995-conflicts-2021-sp",
    );
    let policy = policy();
    let resolver = FakeResolver::new(Resolution::NotFound);
    let tracker = FakeTracker::new(None);
    let reporter = RecordingReporter::default();

    let verdict = BranchValidator::new(&ctx, &policy, &resolver, &tracker, &reporter)
        .run()
        .await
        .unwrap();

    assert!(verdict.is_pass());
    assert!(reporter.comments().is_empty());
    assert!(reporter.warnings().is_empty());
    assert_eq!(resolver.calls(), 0);
    assert_eq!(tracker.calls(), 0);
}

#[tokio::test]
async fn test_unknown_alias_reports_empty_expected_branch() {
    let ctx = context("main", "issue-1-pr-2-conflicts-unknown");
    let policy = policy();
    let resolver = FakeResolver::new(Resolution::NotFound);
    let tracker = FakeTracker::new(None);
    let reporter = RecordingReporter::default();

    let verdict = BranchValidator::new(&ctx, &policy, &resolver, &tracker, &reporter)
        .run()
        .await
        .unwrap();

    // Accepted fallback: the expected-branch slot is empty, the check still
    // fails, and milestone validation is still skipped.
    let expected =
        "@joe This pull request is against the wrong branch. It must be `` instead of `main`";
    assert_eq!(verdict, Verdict::Fail(expected.to_string()));
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_no_issue_found_passes_silently() {
    let ctx = context("release-2022", "some-branch-without-issue");
    let policy = policy();
    let resolver = FakeResolver::new(Resolution::NotFound);
    let tracker = FakeTracker::new(None);
    let reporter = RecordingReporter::default();

    let verdict = BranchValidator::new(&ctx, &policy, &resolver, &tracker, &reporter)
        .run()
        .await
        .unwrap();

    assert!(verdict.is_pass());
    assert!(reporter.comments().is_empty());
    assert_eq!(resolver.calls(), 1);
    assert_eq!(tracker.calls(), 0);
}

#[tokio::test]
async fn test_resolution_error_passes_silently() {
    let ctx = context("release-2022", "some-branch-without-issue");
    let policy = policy();
    let resolver = FakeResolver::new(Resolution::Error);
    let tracker = FakeTracker::new(None);
    let reporter = RecordingReporter::default();

    let verdict = BranchValidator::new(&ctx, &policy, &resolver, &tracker, &reporter)
        .run()
        .await
        .unwrap();

    assert!(verdict.is_pass());
    assert!(reporter.comments().is_empty());
    assert_eq!(tracker.calls(), 0);
}

#[tokio::test]
async fn test_issue_without_milestone_fails() {
    let ctx = context("release-2022", "fix-things");
    let policy = policy();
    let resolver = FakeResolver::new(Resolution::Found(123));
    let tracker = FakeTracker::new(None);
    let reporter = RecordingReporter::default();

    let verdict = BranchValidator::new(&ctx, &policy, &resolver, &tracker, &reporter)
        .run()
        .await
        .unwrap();

    let expected = "Issue #123 is missing a milestone, can't validate the base branch.";
    assert_eq!(verdict, Verdict::Fail(expected.to_string()));
    assert_eq!(reporter.comments(), vec![(1, expected.to_string())]);
    assert_eq!(tracker.calls(), 1);
}

#[tokio::test]
async fn test_unmapped_milestone_fails() {
    let ctx = context("release-2022", "fix-things");
    let policy = policy();
    let resolver = FakeResolver::new(Resolution::Found(123));
    let tracker = FakeTracker::new(Some(Milestone {
        number: 999,
        title: "Unscheduled".to_string(),
    }));
    let reporter = RecordingReporter::default();

    let verdict = BranchValidator::new(&ctx, &policy, &resolver, &tracker, &reporter)
        .run()
        .await
        .unwrap();

    let expected = "@joe Did you use the correct issue number in your commit message? \
                    There was no milestone found for #123";
    assert_eq!(verdict, Verdict::Fail(expected.to_string()));
    assert_eq!(reporter.comments(), vec![(1, expected.to_string())]);
}

#[tokio::test]
async fn test_milestone_branch_mismatch_fails() {
    let ctx = context("release-2022", "fix-things");
    let policy = policy();
    let resolver = FakeResolver::new(Resolution::Found(55));
    let tracker = FakeTracker::new(Some(Milestone {
        number: 7,
        title: "2020 Commercial".to_string(),
    }));
    let reporter = RecordingReporter::default();

    let verdict = BranchValidator::new(&ctx, &policy, &resolver, &tracker, &reporter)
        .run()
        .await
        .unwrap();

    let expected = "@joe it looks like this pull request is against the wrong branch. \
                    It should probably be `release-2020-commercial` instead of `release-2022`";
    assert_eq!(verdict, Verdict::Fail(expected.to_string()));
    assert_eq!(reporter.comments(), vec![(1, expected.to_string())]);
}

#[tokio::test]
async fn test_milestone_branch_match_passes() {
    let ctx = context("release-2020-commercial", "fix-things");
    let policy = policy();
    let resolver = FakeResolver::new(Resolution::Found(55));
    let tracker = FakeTracker::new(Some(Milestone {
        number: 7,
        title: "2020 Commercial".to_string(),
    }));
    let reporter = RecordingReporter::default();

    let verdict = BranchValidator::new(&ctx, &policy, &resolver, &tracker, &reporter)
        .run()
        .await
        .unwrap();

    assert!(verdict.is_pass());
    assert!(reporter.comments().is_empty());
    assert!(reporter.warnings().is_empty());
}

#[tokio::test]
async fn test_issue_fetch_errors_propagate() {
    let ctx = context("release-2022", "fix-things");
    let policy = policy();
    let resolver = FakeResolver::new(Resolution::Found(123));
    let reporter = RecordingReporter::default();

    let result = BranchValidator::new(&ctx, &policy, &resolver, &BrokenTracker, &reporter)
        .run()
        .await;

    // Unlike resolution errors, a failing issue fetch aborts the run without
    // posting anything.
    assert!(result.is_err());
    assert!(reporter.comments().is_empty());
    assert!(reporter.warnings().is_empty());
}
