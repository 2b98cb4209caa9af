use crate::adapters::ProviderError;
use crate::runtime::contract::{FailureReport, JobId};

/// Resolves a pipeline job as succeeded or failed.
pub trait JobReporter {
    fn report_success(&self, job_id: &JobId) -> Result<(), ProviderError>;

    fn report_failure(&self, job_id: &JobId, failure: &FailureReport)
        -> Result<(), ProviderError>;
}
