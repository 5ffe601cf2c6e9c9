//! Failure reporting: a PR timeline comment plus a check-run annotation.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use branchcop_core::Reporter;

use crate::github::GitHubClient;

/// Escape a value for use in a workflow command; the runner unescapes it when
/// rendering the annotation.
fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

pub struct ActionReporter<'a> {
    client: &'a GitHubClient,
}

impl<'a> ActionReporter<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Reporter for ActionReporter<'_> {
    async fn comment(&self, pr_number: u64, body: &str) -> Result<()> {
        let comment = self.client.post_issue_comment(pr_number, body).await?;
        info!("Posted PR comment with id {}", comment.id);
        Ok(())
    }

    fn warn(&self, body: &str) {
        // Workflow command: surfaces as a warning annotation on the check run
        println!("::warning::{}", escape_data(body));
    }
}
