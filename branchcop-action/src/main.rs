use anyhow::Result;
use tracing::{info, Level};

use branchcop_core::{BranchPolicy, BranchValidator, Verdict};

mod config;
mod event;
mod github;
mod reporter;
mod resolver;

use config::ActionConfig;
use github::GitHubClient;
use reporter::ActionReporter;
use resolver::CommitScanResolver;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting base-branch policy check");

    let config = ActionConfig::from_env()?;
    let ctx = event::read_pull_request_context(&config.event_path)?;
    let policy = BranchPolicy::from_file(&config.config_file)?;

    let client = GitHubClient::new(
        config.api_url,
        config.repo_token,
        config.repo_owner,
        config.repo_name,
    )?;
    let resolver = CommitScanResolver::new(&client);
    let reporter = ActionReporter::new(&client);

    let validator = BranchValidator::new(&ctx, &policy, &resolver, &client, &reporter);

    match validator.run().await? {
        Verdict::Pass => Ok(()),
        // Already reported; the exit code marks the check run as failed
        Verdict::Fail(_) => std::process::exit(1),
    }
}
