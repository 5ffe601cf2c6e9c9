//! The `pull_request` event payload delivered by the runner.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use branchcop_core::PullRequestContext;

#[derive(Debug, Deserialize)]
struct PullRequestEvent {
    pull_request: PullRequest,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    number: u64,
    user: User,
    head: PullRequestRef,
    base: PullRequestRef,
}

#[derive(Debug, Deserialize)]
struct PullRequestRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

/// Read the event payload file and build the validation context from it.
pub fn read_pull_request_context(path: &Path) -> Result<PullRequestContext> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event payload {}", path.display()))?;
    let payload: serde_json::Value =
        serde_json::from_str(&raw).context("Event payload is not valid JSON")?;
    context_from_payload(payload)
}

fn context_from_payload(payload: serde_json::Value) -> Result<PullRequestContext> {
    let event: PullRequestEvent = serde_json::from_value(payload.clone())
        .context("Event payload has no usable pull_request data")?;
    let pull_request = event.pull_request;

    // The raw pull_request object travels with the context so the resolver
    // can inspect fields (e.g. the title) this binary does not model.
    let raw_pull_request = payload
        .get("pull_request")
        .cloned()
        .unwrap_or(serde_json::Value::Null);

    Ok(PullRequestContext {
        base_branch: pull_request.base.ref_name,
        head_branch: pull_request.head.ref_name,
        author: format!("@{}", pull_request.user.login),
        number: pull_request.number,
        payload: raw_pull_request,
    })
}
