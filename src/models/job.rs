use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque identifier of a remote analysis job.
///
/// The analysis service hands out integers, but nothing here depends on
/// that: numeric ids go back on the wire as numbers, anything else as a
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Serialize for JobId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(n) => serializer.serialize_u64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct JobIdVisitor;

        impl<'de> Visitor<'de> for JobIdVisitor {
            type Value = JobId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a job id as integer or string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<JobId, E> {
                Ok(JobId::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<JobId, E> {
                Ok(JobId(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<JobId, E> {
                if v.is_empty() {
                    return Err(E::custom("empty job id"));
                }
                Ok(JobId::from(v))
            }
        }

        deserializer.deserialize_any(JobIdVisitor)
    }
}

/// Status of a remote job as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_accepts_number_and_string() {
        let id: JobId = serde_json::from_str("42").unwrap();
        assert_eq!(id, JobId::from(42));
        let id: JobId = serde_json::from_str("\"job-a\"").unwrap();
        assert_eq!(id.as_str(), "job-a");
        assert!(serde_json::from_str::<JobId>("\"\"").is_err());
    }

    #[test]
    fn test_numeric_job_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&JobId::from(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&JobId::from("job-a")).unwrap(), "\"job-a\"");
    }

    #[test]
    fn test_status_wire_values() {
        let status: JobStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, JobStatus::Completed);
        assert!(status.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(serde_json::from_str::<JobStatus>("\"running\"").is_err());
    }
}
