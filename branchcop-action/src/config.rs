//! Action configuration from the runner environment.
//!
//! Inputs declared in `action.yml` arrive as `INPUT_*` environment variables;
//! the rest comes from the standard GitHub Actions runner environment.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Clone)]
pub struct ActionConfig {
    /// Path to the branch policy file (the `config-file` input).
    pub config_file: PathBuf,
    /// Token used for issue reads and comment writes.
    pub repo_token: String,
    pub repo_owner: String,
    pub repo_name: String,
    /// Path to the JSON file holding the `pull_request` event payload.
    pub event_path: PathBuf,
    pub api_url: String,
}

impl ActionConfig {
    pub fn from_env() -> Result<Self> {
        let config_file = env::var("INPUT_CONFIG-FILE")
            .map(PathBuf::from)
            .context("config-file input is required")?;

        let repo_token = resolve_repo_token(
            env::var("INPUT_REPO-TOKEN").ok(),
            env::var("GITHUB_TOKEN").ok(),
        )?;

        let repository = env::var("GITHUB_REPOSITORY")
            .context("GITHUB_REPOSITORY environment variable is required")?;
        let (repo_owner, repo_name) = split_repository(&repository)?;

        let event_path = env::var("GITHUB_EVENT_PATH")
            .map(PathBuf::from)
            .context("GITHUB_EVENT_PATH environment variable is required")?;

        let api_url = env::var("GITHUB_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(ActionConfig {
            config_file,
            repo_token,
            repo_owner,
            repo_name,
            event_path,
            api_url,
        })
    }
}

/// Pick the API token from the `repo-token` input, falling back to the
/// runner-provided `GITHUB_TOKEN`. Blank values count as unset.
fn resolve_repo_token(input: Option<String>, fallback: Option<String>) -> Result<String> {
    input
        .filter(|token| !token.trim().is_empty())
        .or_else(|| fallback.filter(|token| !token.trim().is_empty()))
        .context("repo-token input or GITHUB_TOKEN is required")
}

/// Split `GITHUB_REPOSITORY` (`owner/repo`) into its two parts.
fn split_repository(repository: &str) -> Result<(String, String)> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(anyhow!(
            "Invalid GITHUB_REPOSITORY format: {}",
            repository
        )),
    }
}
