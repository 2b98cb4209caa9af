use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Path pattern that matches every object served by a distribution.
pub const WILDCARD_PATH: &str = "/*";
/// Failure category reported to the pipeline when an invalidation fails.
pub const FAILURE_TYPE_JOB_FAILED: &str = "JobFailed";
/// Longest failure message the pipeline accepts.
pub const MAX_FAILURE_MESSAGE_CHARS: usize = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("{0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(value: impl Into<String>) -> Result<Self, EventError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EventError::Malformed("job id cannot be empty".to_string()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize)]
struct RawJobEvent {
    #[serde(rename = "CodePipeline.job")]
    job: RawJob,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    id: String,
    #[serde(rename = "accountId", default)]
    account_id: Option<String>,
}

/// The slice of a pipeline job event this function cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub job_id: JobId,
    pub account_id: Option<String>,
}

impl JobEvent {
    pub fn from_value(event: Value) -> Result<Self, EventError> {
        if !event.is_object() {
            return Err(EventError::Malformed(
                "job event must be a JSON object".to_string(),
            ));
        }

        let raw: RawJobEvent = serde_json::from_value(event)
            .map_err(|error| EventError::Malformed(format!("malformed job event: {error}")))?;

        Ok(Self {
            job_id: JobId::new(raw.job.id)?,
            account_id: raw.job.account_id,
        })
    }
}

/// Uniqueness token the CDN uses to tell otherwise identical requests apart.
///
/// Rendered as `<unix seconds>.<nanoseconds>` so tokens sort by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerReference(String);

impl CallerReference {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(format!(
            "{}.{:09}",
            instant.timestamp(),
            instant.timestamp_subsec_nanos()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallerReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationRequest {
    pub distribution_id: String,
    pub caller_reference: CallerReference,
    paths: Vec<String>,
}

impl InvalidationRequest {
    /// Builds a request that drops every cached object of the distribution.
    pub fn all_paths(distribution_id: impl Into<String>, caller_reference: CallerReference) -> Self {
        Self {
            distribution_id: distribution_id.into(),
            caller_reference,
            paths: vec![WILDCARD_PATH.to_string()],
        }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn quantity(&self) -> i32 {
        // Always a single wildcard entry.
        self.paths.len() as i32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationReceipt {
    pub invalidation_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub message: String,
    pub failure_type: String,
}

impl FailureReport {
    pub fn job_failed(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if let Some((cut, _)) = message.char_indices().nth(MAX_FAILURE_MESSAGE_CHARS) {
            message.truncate(cut);
        }
        Self {
            message,
            failure_type: FAILURE_TYPE_JOB_FAILED.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn job_event_reads_nested_job_id() {
        let event = JobEvent::from_value(json!({
            "CodePipeline.job": {
                "id": "job-123",
                "accountId": "111122223333",
                "data": {"actionConfiguration": {}}
            }
        }))
        .expect("event should parse");

        assert_eq!(event.job_id.as_str(), "job-123");
        assert_eq!(event.account_id.as_deref(), Some("111122223333"));
    }

    #[test]
    fn job_event_without_account_id_still_parses() {
        let event = JobEvent::from_value(json!({"CodePipeline.job": {"id": "job-123"}}))
            .expect("event should parse");

        assert_eq!(event.job_id.to_string(), "job-123");
        assert!(event.account_id.is_none());
    }

    #[test]
    fn job_event_rejects_missing_job_key() {
        let error = JobEvent::from_value(json!({"detail": {}})).expect_err("event should fail");
        assert!(error.to_string().contains("malformed job event"));
    }

    #[test]
    fn job_event_rejects_blank_job_id() {
        let error = JobEvent::from_value(json!({"CodePipeline.job": {"id": "  "}}))
            .expect_err("event should fail");
        assert_eq!(error.to_string(), "job id cannot be empty");
    }

    #[test]
    fn job_event_rejects_non_object_payload() {
        let error = JobEvent::from_value(json!(["job-123"])).expect_err("event should fail");
        assert_eq!(error.to_string(), "job event must be a JSON object");
    }

    #[test]
    fn caller_reference_encodes_seconds_and_nanos() {
        let instant = DateTime::from_timestamp(1_700_000_000, 5).expect("valid timestamp");
        assert_eq!(CallerReference::at(instant).as_str(), "1700000000.000000005");
    }

    #[test]
    fn caller_references_differ_for_distinct_instants() {
        let first = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        let second = DateTime::from_timestamp(1_700_000_000, 1).expect("valid timestamp");
        assert_ne!(CallerReference::at(first), CallerReference::at(second));
    }

    #[test]
    fn invalidation_request_targets_single_wildcard_path() {
        let instant = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        let request = InvalidationRequest::all_paths("E1234ABCD", CallerReference::at(instant));

        assert_eq!(request.distribution_id, "E1234ABCD");
        assert_eq!(request.paths(), ["/*".to_string()]);
        assert_eq!(request.quantity(), 1);
    }

    #[test]
    fn failure_report_uses_job_failed_category() {
        let report = FailureReport::job_failed("x");
        assert_eq!(report.message, "x");
        assert_eq!(report.failure_type, "JobFailed");
    }

    #[test]
    fn failure_report_truncates_oversized_messages() {
        let report = FailureReport::job_failed("é".repeat(MAX_FAILURE_MESSAGE_CHARS + 10));
        assert_eq!(report.message.chars().count(), MAX_FAILURE_MESSAGE_CHARS);
    }
}
