use serde::{Deserialize, Serialize};

use crate::errors::VulnrecError;
use super::finding::Finding;

pub const SCORE_MIN: u8 = 0;
pub const SCORE_MAX: u8 = 100;

/// Inclusive `[min, max]` range over a 0-100 score. Serialized as a two
/// element array, the form the analysis service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct ScoreRange {
    min: u8,
    max: u8,
}

impl ScoreRange {
    pub const FULL: ScoreRange = ScoreRange { min: SCORE_MIN, max: SCORE_MAX };

    pub fn new(min: u8, max: u8) -> Result<Self, VulnrecError> {
        if max > SCORE_MAX {
            return Err(VulnrecError::InvalidFilter(format!(
                "upper bound {} exceeds {}", max, SCORE_MAX
            )));
        }
        if min > max {
            return Err(VulnrecError::InvalidFilter(format!(
                "lower bound {} is above upper bound {}", min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// `[0, 100]` filters nothing.
    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl TryFrom<(u8, u8)> for ScoreRange {
    type Error = VulnrecError;

    fn try_from((min, max): (u8, u8)) -> Result<Self, Self::Error> {
        ScoreRange::new(min, max)
    }
}

impl From<ScoreRange> for (u8, u8) {
    fn from(range: ScoreRange) -> Self {
        (range.min, range.max)
    }
}

/// Criteria applied to findings, either at upload time, on the result
/// fetch, or client-side over an example fixture.
///
/// Full ranges and empty lists mean "no constraint" and are left out of
/// the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FindingFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<ScoreRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ScoreRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cve_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cwe_ids: Vec<String>,
}

impl FindingFilter {
    pub fn with_severity(mut self, range: ScoreRange) -> Self {
        self.set_severity(range);
        self
    }

    pub fn with_priority(mut self, range: ScoreRange) -> Self {
        self.priority = (!range.is_full()).then_some(range);
        self
    }

    pub fn set_severity(&mut self, range: ScoreRange) {
        self.severity = (!range.is_full()).then_some(range);
    }

    /// Effective severity range; `FULL` when unconstrained.
    pub fn severity_range(&self) -> ScoreRange {
        self.severity.unwrap_or(ScoreRange::FULL)
    }

    /// Copy with full ranges dropped so they never reach the wire.
    pub fn normalized(&self) -> Self {
        Self {
            severity: self.severity.filter(|r| !r.is_full()),
            priority: self.priority.filter(|r| !r.is_full()),
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        let n = self.normalized();
        n.severity.is_none()
            && n.priority.is_none()
            && n.source.is_empty()
            && n.cve_ids.is_empty()
            && n.cwe_ids.is_empty()
    }

    pub fn matches(&self, finding: &Finding) -> bool {
        if !self.severity_range().contains(finding.severity) {
            return false;
        }
        if let Some(priority) = self.priority {
            if !priority.contains(finding.priority) {
                return false;
            }
        }
        intersects(&self.source, &finding.source)
            && intersects(&self.cve_ids, &finding.cve_ids)
            && intersects(&self.cwe_ids, &finding.cwe_ids)
    }
}

/// An empty wanted-list matches everything.
fn intersects(wanted: &[String], present: &[String]) -> bool {
    wanted.is_empty()
        || present
            .iter()
            .any(|p| wanted.iter().any(|w| w.eq_ignore_ascii_case(p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finding::FindingKind;
    use crate::models::solution::Solution;

    fn finding(severity: u8, priority: u8, source: &str, cve: &[&str]) -> Finding {
        Finding {
            title: vec![format!("finding {}", severity)],
            source: vec![source.to_string()],
            description: vec![],
            cwe_ids: vec![],
            cve_ids: cve.iter().map(|c| c.to_string()).collect(),
            severity,
            priority,
            category: FindingKind::Default,
            solution: Solution::default(),
        }
    }

    #[test]
    fn test_range_validation() {
        assert!(ScoreRange::new(0, 100).is_ok());
        assert!(ScoreRange::new(50, 50).is_ok());
        assert!(ScoreRange::new(60, 40).is_err());
        assert!(ScoreRange::new(0, 101).is_err());
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let range = ScoreRange::new(10, 50).unwrap();
        assert!(range.contains(10));
        assert!(range.contains(50));
        assert!(!range.contains(9));
        assert!(!range.contains(51));
    }

    #[test]
    fn test_full_range_omitted_from_wire() {
        let filter = FindingFilter::default().with_severity(ScoreRange::FULL);
        assert_eq!(filter.severity, None);
        assert_eq!(serde_json::to_value(&filter).unwrap(), serde_json::json!({}));

        let explicit = FindingFilter { severity: Some(ScoreRange::FULL), ..Default::default() };
        assert_eq!(serde_json::to_value(explicit.normalized()).unwrap(), serde_json::json!({}));
        assert!(explicit.is_empty());
    }

    #[test]
    fn test_partial_range_serialized_as_pair() {
        let filter = FindingFilter::default().with_severity(ScoreRange::new(0, 50).unwrap());
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            serde_json::json!({"severity": [0, 50]})
        );
        let back: FindingFilter = serde_json::from_str(r#"{"severity": [0, 50]}"#).unwrap();
        assert_eq!(back, filter);
        assert!(serde_json::from_str::<FindingFilter>(r#"{"severity": [70, 20]}"#).is_err());
    }

    #[test]
    fn test_full_range_behaves_like_no_filter() {
        let f = finding(100, 0, "Trivy", &[]);
        let explicit = FindingFilter { severity: Some(ScoreRange::FULL), ..Default::default() };
        assert!(explicit.matches(&f));
        assert!(FindingFilter::default().matches(&f));
    }

    #[test]
    fn test_matches_lists() {
        let f = finding(40, 20, "Trivy", &["CVE-2023-4132"]);
        let by_source = FindingFilter { source: vec!["trivy".into()], ..Default::default() };
        assert!(by_source.matches(&f));
        let other_source = FindingFilter { source: vec!["Grype".into()], ..Default::default() };
        assert!(!other_source.matches(&f));
        let by_cve = FindingFilter { cve_ids: vec!["CVE-2023-4132".into()], ..Default::default() };
        assert!(by_cve.matches(&f));
        let by_priority = FindingFilter::default().with_priority(ScoreRange::new(50, 100).unwrap());
        assert!(!by_priority.matches(&f));
    }
}
