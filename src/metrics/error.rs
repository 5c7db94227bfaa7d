use thiserror::Error;

/// Failure taxonomy for metric plugins and their collaborators.
///
/// Any of these failing inside a plugin fails only the target being scored;
/// the orchestrator converts them into per-target error entries.
#[derive(Debug, Error)]
pub enum MetricError {
    /// Malformed input reached a plugin, e.g. an unsupported target.
    #[error("invalid input for {metric}: {reason}")]
    Validation { metric: &'static str, reason: String },

    /// A network, API, or version-control call failed.
    #[error("{service} call failed{}: {reason}", fmt_status(.status, .timed_out))]
    ExternalService {
        service: &'static str,
        status: Option<u16>,
        timed_out: bool,
        reason: String,
    },

    /// Internal scoring failure unrelated to external services.
    #[error("{metric} computation failed: {reason}")]
    Computation { metric: &'static str, reason: String },
}

fn fmt_status(status: &Option<u16>, timed_out: &bool) -> String {
    match (status, *timed_out) {
        (Some(code), _) => format!(" (status {code})"),
        (None, true) => " (timed out)".to_string(),
        (None, false) => String::new(),
    }
}

impl MetricError {
    pub fn validation(metric: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            metric,
            reason: reason.into(),
        }
    }

    pub fn service(service: &'static str, status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::ExternalService {
            service,
            status,
            timed_out: false,
            reason: reason.into(),
        }
    }

    pub fn timeout(service: &'static str, reason: impl Into<String>) -> Self {
        Self::ExternalService {
            service,
            status: None,
            timed_out: true,
            reason: reason.into(),
        }
    }

    pub fn computation(metric: &'static str, reason: impl Into<String>) -> Self {
        Self::Computation {
            metric,
            reason: reason.into(),
        }
    }

    /// Whether this failure was caused by an external call exceeding its timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ExternalService { timed_out: true, .. }
        )
    }
}
