//! Branch-alias extraction for automated merge-conflict-resolution branches.

use std::sync::OnceLock;

use regex::Regex;

static CONFLICT_BRANCH: OnceLock<Regex> = OnceLock::new();

/// Extract the target-branch alias from a conflict-resolution branch name.
///
/// Conflict-resolution pull requests are machine-generated with head branches
/// named `issue-<digits>-pr-<digits>-conflicts-<alias>`, where the alias is a
/// trailing run of word characters and hyphens. Returns `None` for any other
/// branch name.
pub fn conflict_branch_alias(head_branch: &str) -> Option<&str> {
    let pattern = CONFLICT_BRANCH.get_or_init(|| {
        Regex::new(r"issue-\d+-pr-\d+-conflicts-([\w-]+)$")
            .expect("conflict branch pattern should be valid")
    });
    pattern
        .captures(head_branch)
        .and_then(|caps| caps.get(1))
        .map(|alias| alias.as_str())
}
