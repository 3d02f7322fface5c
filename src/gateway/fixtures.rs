//! Precomputed result sets shipped inside the binary.

use tracing::warn;

use crate::errors::VulnrecError;
use crate::models::ResultSet;

pub const DEFAULT_EXAMPLE: &str = "llama3";

const FIXTURES: &[(&str, &str)] = &[
    ("llama3", include_str!("../../assets/examples/llama3.json")),
    ("claude-opus", include_str!("../../assets/examples/claude-opus.json")),
    ("gpt4o", include_str!("../../assets/examples/gpt4o.json")),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCatalog;

impl FixtureCatalog {
    pub fn names(&self) -> Vec<&'static str> {
        FIXTURES.iter().map(|(name, _)| *name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        FIXTURES.iter().any(|(n, _)| *n == name)
    }

    /// Parse the named fixture. Unknown names fall back to the default.
    pub fn load(&self, name: &str) -> Result<ResultSet, VulnrecError> {
        let raw = match FIXTURES.iter().find(|(n, _)| *n == name) {
            Some((_, raw)) => *raw,
            None => {
                warn!(requested = name, fallback = DEFAULT_EXAMPLE, "Unknown example, using default");
                FIXTURES
                    .iter()
                    .find(|(n, _)| *n == DEFAULT_EXAMPLE)
                    .map(|(_, raw)| *raw)
                    .ok_or_else(|| VulnrecError::Internal("default example missing".into()))?
            }
        };
        serde_json::from_str(raw)
            .map_err(|e| VulnrecError::Internal(format!("example '{}' is corrupt: {}", name, e)))
    }
}
