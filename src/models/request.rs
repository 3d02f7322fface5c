use serde::{Deserialize, Serialize};

use super::filter::FindingFilter;
use super::pagination::PaginationInput;

/// What the analysis service should generate for each finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPreferences {
    pub long_description: bool,
    pub search_terms: bool,
    pub aggregated_solutions: bool,
}

impl Default for UploadPreferences {
    fn default() -> Self {
        Self {
            long_description: true,
            search_terms: true,
            aggregated_solutions: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UploadOptions {
    pub preferences: UploadPreferences,
    /// Replace an existing job for equivalent input instead of conflicting.
    pub force_update: bool,
}

/// Filter and page for a result fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultQuery {
    pub filter: FindingFilter,
    pub pagination: PaginationInput,
}
