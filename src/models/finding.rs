use serde::{Deserialize, Serialize};

use super::serde_util::{one_or_many, score};
use super::solution::Solution;

/// Kind of system the finding affects, as classified by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    System,
    Program,
    User,
    Code,
    #[default]
    Default,
}

/// A single reported vulnerability with its recommended solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default, deserialize_with = "one_or_many")]
    pub title: Vec<String>,
    /// Scanners that reported the finding (e.g. "Trivy", "Grype").
    #[serde(default, deserialize_with = "one_or_many")]
    pub source: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub description: Vec<String>,
    #[serde(default)]
    pub cwe_ids: Vec<String>,
    #[serde(default)]
    pub cve_ids: Vec<String>,
    /// 0-100, higher is worse.
    #[serde(deserialize_with = "score")]
    pub severity: u8,
    /// 0-100, higher is more urgent.
    #[serde(deserialize_with = "score")]
    pub priority: u8,
    #[serde(default)]
    pub category: FindingKind,
    #[serde(default)]
    pub solution: Solution,
}

impl Finding {
    /// Title for single-line display: the first reported title.
    pub fn headline(&self) -> &str {
        self.title.first().map(String::as_str).unwrap_or("(untitled finding)")
    }
}
