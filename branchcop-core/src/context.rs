/// Facts about the pull request under validation, captured once per run from
/// the CI-provided event data.
#[derive(Debug, Clone)]
pub struct PullRequestContext {
    /// Branch the pull request wants to merge into.
    pub base_branch: String,
    /// Branch carrying the proposed changes.
    pub head_branch: String,
    /// Author rendered as a mention, e.g. `@joe`.
    pub author: String,
    /// Pull request number.
    pub number: u64,
    /// Full pull-request payload, passed through untouched so issue-number
    /// resolvers can inspect fields this crate does not model.
    pub payload: serde_json::Value,
}
