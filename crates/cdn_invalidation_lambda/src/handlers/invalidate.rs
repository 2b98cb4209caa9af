use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::adapters::cdn::CdnInvalidator;
use crate::adapters::pipeline::JobReporter;
use crate::adapters::ProviderError;
use crate::runtime::config::{ConfigError, HandlerConfig, DISTRIBUTION_ID_VAR};
use crate::runtime::contract::{
    CallerReference, EventError, FailureReport, InvalidationRequest, JobEvent, JobId,
};

const COMPONENT: &str = "invalidation_handler";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvalidationResponse {
    pub status: String,
    pub job_id: String,
    pub invalidation_id: String,
    pub caller_reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    MalformedEvent(#[from] EventError),
    #[error(transparent)]
    Provider(ProviderError),
    #[error("failed to report job success: {0}")]
    Report(ProviderError),
}

pub fn handle_job_event(
    event: Value,
    distribution_id: Option<&str>,
    invalidator: &impl CdnInvalidator,
    reporter: &impl JobReporter,
) -> Result<InvalidationResponse, HandlerError> {
    handle_job_event_at(event, distribution_id, Utc::now(), invalidator, reporter)
}

/// Invalidates every path of the configured distribution and resolves the
/// pipeline job that triggered the invocation.
///
/// Configuration and event errors return before any external call. Once the
/// invalidation has been attempted the job is always reported, as a success
/// or as a `JobFailed` failure, and provider errors are still returned so the
/// runtime marks the invocation failed.
pub fn handle_job_event_at(
    event: Value,
    distribution_id: Option<&str>,
    now: DateTime<Utc>,
    invalidator: &impl CdnInvalidator,
    reporter: &impl JobReporter,
) -> Result<InvalidationResponse, HandlerError> {
    let config = HandlerConfig::from_lookup(|key| match key {
        DISTRIBUTION_ID_VAR => distribution_id.map(str::to_string),
        _ => None,
    })?;
    let job = JobEvent::from_value(event)?;

    let request = InvalidationRequest::all_paths(config.distribution_id, CallerReference::at(now));
    info!(
        component = COMPONENT,
        event = "invalidation_requested",
        job_id = %job.job_id,
        account_id = job.account_id.as_deref().unwrap_or_default(),
        distribution_id = %request.distribution_id,
        caller_reference = %request.caller_reference,
        "requesting invalidation"
    );

    let receipt = match invalidator.create_invalidation(&request) {
        Ok(receipt) => receipt,
        Err(provider_error) => {
            error!(
                component = COMPONENT,
                event = "invalidation_failed",
                job_id = %job.job_id,
                distribution_id = %request.distribution_id,
                error = %provider_error,
                "error during invalidation"
            );
            report_failure(reporter, &job.job_id, &provider_error);
            return Err(HandlerError::Provider(provider_error));
        }
    };

    info!(
        component = COMPONENT,
        event = "invalidation_created",
        job_id = %job.job_id,
        invalidation_id = %receipt.invalidation_id,
        receipt = ?receipt,
        "invalidation successful"
    );

    if let Err(report_error) = reporter.report_success(&job.job_id) {
        error!(
            component = COMPONENT,
            event = "success_report_failed",
            job_id = %job.job_id,
            error = %report_error,
            "failed to report job success"
        );
        report_failure(reporter, &job.job_id, &report_error);
        return Err(HandlerError::Report(report_error));
    }

    Ok(InvalidationResponse {
        status: "ok".to_string(),
        job_id: job.job_id.to_string(),
        invalidation_id: receipt.invalidation_id,
        caller_reference: request.caller_reference.to_string(),
    })
}

fn report_failure(reporter: &impl JobReporter, job_id: &JobId, cause: &ProviderError) {
    let failure = FailureReport::job_failed(cause.message.clone());
    if let Err(error) = reporter.report_failure(job_id, &failure) {
        // The caller's error is the one returned; this one is only logged.
        warn!(
            component = COMPONENT,
            event = "failure_report_failed",
            job_id = %job_id,
            error = %error,
            "failed to report job failure"
        );
    }
}
