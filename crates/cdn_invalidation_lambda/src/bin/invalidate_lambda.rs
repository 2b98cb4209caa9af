use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use aws_sdk_codepipeline::types::{FailureDetails, FailureType};
use cdn_invalidation_lambda::adapters::cdn::CdnInvalidator;
use cdn_invalidation_lambda::adapters::pipeline::JobReporter;
use cdn_invalidation_lambda::adapters::ProviderError;
use cdn_invalidation_lambda::handlers::invalidate::{handle_job_event, InvalidationResponse};
use cdn_invalidation_lambda::logging::{init_logging, LogFormat};
use cdn_invalidation_lambda::runtime::config::DISTRIBUTION_ID_VAR;
use cdn_invalidation_lambda::runtime::contract::{
    FailureReport, InvalidationReceipt, InvalidationRequest, JobId,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct CloudFrontInvalidator {
    client: aws_sdk_cloudfront::Client,
}

impl CdnInvalidator for CloudFrontInvalidator {
    fn create_invalidation(
        &self,
        request: &InvalidationRequest,
    ) -> Result<InvalidationReceipt, ProviderError> {
        let paths = Paths::builder()
            .quantity(request.quantity())
            .set_items(Some(request.paths().to_vec()))
            .build()
            .map_err(|error| ProviderError::new(format!("invalid invalidation paths: {error}")))?;
        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(request.caller_reference.as_str())
            .build()
            .map_err(|error| ProviderError::new(format!("invalid invalidation batch: {error}")))?;
        let distribution_id = request.distribution_id.clone();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .create_invalidation()
                    .distribution_id(distribution_id)
                    .invalidation_batch(batch)
                    .send()
                    .await
                    .map_err(|error| {
                        ProviderError::new(
                            aws_sdk_cloudfront::error::DisplayErrorContext(&error).to_string(),
                        )
                    })?;

                let invalidation = output.invalidation().ok_or_else(|| {
                    ProviderError::new("create invalidation response did not include an invalidation")
                })?;

                Ok(InvalidationReceipt {
                    invalidation_id: invalidation.id().to_string(),
                    status: invalidation.status().to_string(),
                    location: output.location().map(str::to_string),
                })
            })
        })
    }
}

struct CodePipelineReporter {
    client: aws_sdk_codepipeline::Client,
}

impl JobReporter for CodePipelineReporter {
    fn report_success(&self, job_id: &JobId) -> Result<(), ProviderError> {
        let job_id = job_id.to_string();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_job_success_result()
                    .job_id(job_id)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        ProviderError::new(format!(
                            "failed to put job success result: {}",
                            aws_sdk_codepipeline::error::DisplayErrorContext(&error)
                        ))
                    })
            })
        })
    }

    fn report_failure(
        &self,
        job_id: &JobId,
        failure: &FailureReport,
    ) -> Result<(), ProviderError> {
        let details = FailureDetails::builder()
            .r#type(FailureType::from(failure.failure_type.as_str()))
            .message(failure.message.clone())
            .build()
            .map_err(|error| ProviderError::new(format!("invalid failure details: {error}")))?;
        let job_id = job_id.to_string();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_job_failure_result()
                    .job_id(job_id)
                    .failure_details(details)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        ProviderError::new(format!(
                            "failed to put job failure result: {}",
                            aws_sdk_codepipeline::error::DisplayErrorContext(&error)
                        ))
                    })
            })
        })
    }
}

async fn handle_request(
    event: LambdaEvent<Value>,
    invalidator: &CloudFrontInvalidator,
    reporter: &CodePipelineReporter,
) -> Result<InvalidationResponse, Error> {
    let distribution_id = std::env::var(DISTRIBUTION_ID_VAR).ok();

    handle_job_event(
        event.payload,
        distribution_id.as_deref(),
        invalidator,
        reporter,
    )
    .map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging(LogFormat::from_env());

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let invalidator = CloudFrontInvalidator {
        client: aws_sdk_cloudfront::Client::new(&aws_config),
    };
    let reporter = CodePipelineReporter {
        client: aws_sdk_codepipeline::Client::new(&aws_config),
    };

    let invalidator = &invalidator;
    let reporter = &reporter;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, invalidator, reporter).await
    }))
    .await
}
