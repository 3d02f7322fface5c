use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::finding::Finding;
use super::serde_util::{one_or_many, search_terms};

/// Remediation generated for a single finding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Solution {
    #[serde(default)]
    pub short_description: Option<String>,
    /// Step-by-step instructions; a single narrative arrives as one step.
    #[serde(default, deserialize_with = "one_or_many")]
    pub long_description: Vec<String>,
    #[serde(default, deserialize_with = "search_terms")]
    pub search_terms: Vec<String>,
    /// Prompt and model bookkeeping from the analysis service.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A synthesized remediation that fixes several findings at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSolution {
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub solution: String,
    /// Why the findings were grouped together; free-form, may be null.
    #[serde(default)]
    pub metadata: Value,
}
