//! CI orchestration bridge — drives per-branch build pipelines from
//! source-control webhook events and reflects build outcomes back onto
//! commit statuses and a public status badge.
//!
//! The bridge is stateless: pipeline, status, and storage state live in the
//! external services, and every invocation re-fetches what it needs. Batches
//! of event records are processed strictly in arrival order; the first error
//! terminates the batch and becomes the invocation result.

pub mod config;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod models;
pub mod services;
