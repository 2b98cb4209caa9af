//! AWS-oriented adapters and handlers for CDN cache invalidation.
//!
//! This crate owns runtime integration details (the Lambda handler, the
//! CloudFront and CodePipeline capability traits, and logging setup) and
//! re-exports the core contract and config modules under `runtime`.

pub mod adapters;
pub mod handlers;
pub mod logging;
pub mod runtime;
