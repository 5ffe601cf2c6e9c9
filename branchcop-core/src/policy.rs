//! Repository branch-targeting policy.
//!
//! The policy file maps branch aliases (used by conflict-resolution branches)
//! and milestone numbers to the release branch a pull request must target:
//!
//! ```json
//! {
//!     "branchByAlias": { "2021-sp": { "name": "release-2021-commercial-sp" } },
//!     "branchNameByMilestoneNumber": { "207": "release-2022" }
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Target branch entry in the alias table.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchTarget {
    pub name: String,
}

/// The two read-only mappings loaded from the policy file. Either section may
/// be omitted and behaves as an empty map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchPolicy {
    #[serde(default)]
    pub branch_by_alias: HashMap<String, BranchTarget>,
    #[serde(default)]
    pub branch_name_by_milestone_number: HashMap<u64, String>,
}

impl BranchPolicy {
    /// Load the policy from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read branch policy file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to parse branch policy file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Branch policy is not valid JSON")
    }

    /// Branch name a conflict-resolution alias resolves to, if the alias is
    /// known.
    pub fn branch_for_alias(&self, alias: &str) -> Option<&str> {
        self.branch_by_alias.get(alias).map(|target| target.name.as_str())
    }

    /// Branch name a milestone maps to, if the milestone is known.
    pub fn branch_for_milestone(&self, milestone_number: u64) -> Option<&str> {
        self.branch_name_by_milestone_number
            .get(&milestone_number)
            .map(String::as_str)
    }
}
