//! Minimal GitHub REST client for the calls this action performs.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use branchcop_core::{Issue, IssueTracker, Milestone};

pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: String,
    repo_owner: String,
    repo_name: String,
}

#[derive(Debug, Serialize)]
struct CreateCommentRequest {
    body: String,
}

#[derive(Debug, Deserialize)]
pub struct Comment {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct IssueResponse {
    pub number: u64,
    pub milestone: Option<MilestoneResponse>,
}

#[derive(Debug, Deserialize)]
pub struct MilestoneResponse {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct CommitEntry {
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub struct CommitDetail {
    pub message: String,
}

impl GitHubClient {
    pub fn new(
        api_url: String,
        token: String,
        repo_owner: String,
        repo_name: String,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("branchcop/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url,
            token,
            repo_owner,
            repo_name,
        })
    }

    pub async fn get_issue(&self, issue_number: u64) -> Result<IssueResponse> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}",
            self.api_url, self.repo_owner, self.repo_name, issue_number
        );

        info!(
            "Fetching issue #{} in {}/{}",
            issue_number, self.repo_owner, self.repo_name
        );

        let response = self
            .send_get(&url)
            .await
            .context("Failed to send issue request")?;

        self.check_status(response, "Get issue")
            .await?
            .json()
            .await
            .context("Failed to parse issue response")
    }

    pub async fn list_pull_request_commits(&self, pr_number: u64) -> Result<Vec<CommitEntry>> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/commits?per_page=100",
            self.api_url, self.repo_owner, self.repo_name, pr_number
        );

        info!(
            "Listing commits for PR #{} in {}/{}",
            pr_number, self.repo_owner, self.repo_name
        );

        let response = self
            .send_get(&url)
            .await
            .context("Failed to send commit list request")?;

        self.check_status(response, "List PR commits")
            .await?
            .json()
            .await
            .context("Failed to parse commit list response")
    }

    pub async fn post_issue_comment(&self, issue_number: u64, body: &str) -> Result<Comment> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, self.repo_owner, self.repo_name, issue_number
        );

        info!(
            "Posting comment to PR #{} in {}/{}",
            issue_number, self.repo_owner, self.repo_name
        );

        let request_body = CreateCommentRequest {
            body: body.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .json(&request_body)
            .send()
            .await
            .context("Failed to send PR comment request")?;

        self.check_status(response, "Create PR comment")
            .await?
            .json()
            .await
            .context("Failed to parse comment response")
    }

    async fn send_get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
        operation: &str,
    ) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response
            .text()
            .await
            .context("Failed to read error response body")?;
        error!("{} failed: {} - {}", operation, status, error_text);
        Err(anyhow!("GitHub API error: {} - {}", status, error_text))
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn issue(&self, number: u64) -> Result<Issue> {
        let response = self.get_issue(number).await?;
        Ok(Issue {
            number: response.number,
            milestone: response.milestone.map(|milestone| Milestone {
                number: milestone.number,
                title: milestone.title,
            }),
        })
    }
}
