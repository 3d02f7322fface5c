use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use super::filter::FindingFilter;
use super::finding::Finding;
use super::pagination::Pagination;
use super::solution::AggregatedSolution;

/// Findings plus aggregated solutions as delivered by one fetch or fixture.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub aggregated_solutions: Vec<AggregatedSolution>,
    /// Page envelope from the service; fixtures have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl ResultSet {
    /// Subset matching `filter`. Aggregated solutions keep only matching
    /// findings and are dropped once they have none left.
    pub fn filtered(&self, filter: &FindingFilter) -> ResultSet {
        let findings = self
            .findings
            .iter()
            .filter(|f| filter.matches(f))
            .cloned()
            .collect();

        let mut aggregated_solutions: Vec<AggregatedSolution> = self
            .aggregated_solutions
            .iter()
            .filter_map(|agg| {
                let remaining: Vec<Finding> = agg
                    .findings
                    .iter()
                    .filter(|f| filter.matches(f))
                    .cloned()
                    .collect();
                (!remaining.is_empty()).then(|| AggregatedSolution {
                    findings: remaining,
                    ..agg.clone()
                })
            })
            .collect();
        sort_aggregated(&mut aggregated_solutions);

        ResultSet {
            findings,
            aggregated_solutions,
            pagination: self.pagination.clone(),
        }
    }
}

/// Order aggregated solutions by descending finding count. The sort is
/// stable, so equal counts keep their prior relative order.
pub fn sort_aggregated(solutions: &mut [AggregatedSolution]) {
    solutions.sort_by_key(|s| Reverse(s.findings.len()));
}
