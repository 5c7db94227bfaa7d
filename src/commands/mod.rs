//! Command-line interface for model-rank
//!
//! This module parses arguments and coordinates the rest of the crate to
//! perform end-to-end scoring: read the targets file, assemble the plugin
//! registry over the shared hub and git collaborators, drive the
//! orchestrator, and emit one NDJSON record per scored target.
//!
//! The `run` function parses command-line arguments using clap and routes to
//! the appropriate command handler. All output flows through the [`Host`]
//! abstraction so commands can run against captured buffers in tests.

mod host;
mod run;
mod score;

pub use host::Host;
pub use run::run;
pub use score::{ScoreArgs, parse_targets, process_score};
