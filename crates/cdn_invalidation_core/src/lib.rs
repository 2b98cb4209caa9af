//! Shared CDN invalidation domain primitives.
//!
//! This crate owns the pipeline job event shape, invalidation request
//! construction and configuration loading. It intentionally excludes AWS SDK
//! and Lambda runtime concerns, which live in `cdn_invalidation_lambda`.

pub mod config;
pub mod contract;
