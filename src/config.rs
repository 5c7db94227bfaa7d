//! Runtime configuration for the scoring pipeline.

use core::time::Duration;
use url::Url;

/// Default worker-pool width for the orchestrator.
pub const DEFAULT_WORKERS: usize = 8;

/// Default per-request timeout for hub API calls, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default timeout for a shallow git clone, in seconds.
pub const DEFAULT_CLONE_TIMEOUT_SECS: u64 = 120;

/// Default timeout for a git log query, in seconds.
pub const DEFAULT_LOG_TIMEOUT_SECS: u64 = 25;

/// Default hub base URL.
pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";

/// Resolved configuration handed to the collaborators and the orchestrator.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Worker-pool width: how many targets are scored concurrently.
    pub workers: usize,

    /// Base URL of the hosted-repository metadata service.
    pub hub_url: Url,

    /// Per-request timeout for hub API calls.
    pub http_timeout: Duration,

    /// Timeout for one git clone subprocess.
    pub clone_timeout: Duration,

    /// Timeout for one git log subprocess.
    pub log_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            hub_url: Url::parse(DEFAULT_HUB_URL).expect("default hub URL must parse"),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            clone_timeout: Duration::from_secs(DEFAULT_CLONE_TIMEOUT_SECS),
            log_timeout: Duration::from_secs(DEFAULT_LOG_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.workers, 8);
        assert_eq!(config.hub_url.as_str(), "https://huggingface.co/");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }
}
