//! External collaborator interfaces
//!
//! The scoring core never talks to the outside world directly; it consumes
//! typed results from two injected capabilities:
//!
//! - [`HubClient`]: artifact descriptors and file manifests from the hosted
//!   repository metadata service
//! - [`CommitLog`]: commit timestamps and author identities from a local
//!   version-control query
//!
//! Both are traits so unit tests substitute deterministic fakes instead of
//! real network calls or subprocesses. Each production implementation bounds
//! every external call with its own fixed timeout.

mod hub;
mod vcs;

pub use hub::{ArtifactDescriptor, FileEntry, HttpHubClient, HubClient};
pub use vcs::{CommitHistory, CommitLog, CommitRecord, GitCli};
