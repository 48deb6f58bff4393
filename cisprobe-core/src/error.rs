use cisprobe_model::ModelError;
use thiserror::Error;

/// Everything that can stop an invocation before an evaluation is reported.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The invocation payload could not be decoded.
    #[error("Invalid invocation payload: {0}")]
    Envelope(#[from] ModelError),

    /// The execution service refused to start the scan.
    #[error("Check dispatch rejected: {0}")]
    DispatchRejected(String),

    /// The execution record is not queryable yet. Retried.
    #[error("Execution record not available yet: {0}")]
    ExecutionUnavailable(String),

    /// The execution service is rate limiting status queries. Retried.
    #[error("Status query throttled: {0}")]
    Throttled(String),

    /// A status query failed for a reason that retrying will not fix.
    #[error("Status query failed: {0}")]
    StatusQuery(String),

    /// The reporting service did not accept the evaluation.
    #[error("Evaluation report failed: {0}")]
    Reporting(String),
}

impl ProbeError {
    /// Whether a status poll that failed with this error should be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProbeError::ExecutionUnavailable(_) | ProbeError::Throttled(_)
        )
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unavailable_and_throttled_are_transient() {
        assert!(ProbeError::ExecutionUnavailable("x".into()).is_transient());
        assert!(ProbeError::Throttled("x".into()).is_transient());
        assert!(!ProbeError::DispatchRejected("x".into()).is_transient());
        assert!(!ProbeError::StatusQuery("x".into()).is_transient());
        assert!(!ProbeError::Reporting("x".into()).is_transient());
    }
}
