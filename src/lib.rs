//! model-rank crate
//!
//! This crate scores hosted machine-learning artifact repositories (models,
//! datasets, and code repositories) against a battery of independent metric
//! plugins and reduces their outputs into one weighted trust score per target.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and dispatch
//! - [`model`]: Scoring data model and merge semantics
//! - [`metrics`]: Metric plugin trait, registry, and the plugin implementations
//! - [`orchestrator`]: Parallel fan-out/merge scoring pipeline
//! - [`sources`]: External collaborator interfaces (hub metadata, git history)
//! - [`reports`]: NDJSON output generation

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod commands;

#[doc(hidden)]
pub mod config;

#[doc(hidden)]
pub mod metrics;

#[doc(hidden)]
pub mod model;

#[doc(hidden)]
pub mod orchestrator;

#[doc(hidden)]
pub mod reports;

#[doc(hidden)]
pub mod sources;

pub use crate::commands::{Host, run};
