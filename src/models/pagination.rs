use serde::{Deserialize, Serialize};

/// Page request sent with every result fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInput {
    pub offset: u64,
    pub limit: u64,
}

impl Default for PaginationInput {
    fn default() -> Self {
        Self { offset: 0, limit: 100 }
    }
}

/// Page envelope returned by the analysis service. Kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
    pub count: u64,
}
