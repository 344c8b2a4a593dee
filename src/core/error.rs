//! Failure taxonomy of a single fetch-and-store invocation.

use thiserror::Error;

/// Every variant is terminal for the invocation that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateError {
    /// Non-2xx status or a network level failure talking to the quote provider.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The quote payload did not have the expected shape or held an unusable rate.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The settings store rejected the read or write.
    #[error("Persistence error: {0}")]
    PersistenceError(String),
}

impl RateError {
    /// Whether a later attempt might succeed with the same inputs.
    pub fn is_transient(&self) -> bool {
        !matches!(self, RateError::MalformedResponse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RateError::UpstreamUnavailable("HTTP 503".to_string());
        assert_eq!(err.to_string(), "Upstream unavailable: HTTP 503");

        let err = RateError::MalformedResponse("missing quotes[0].midpoint".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed response: missing quotes[0].midpoint"
        );
    }

    #[test]
    fn test_malformed_is_not_transient() {
        assert!(RateError::UpstreamUnavailable(String::new()).is_transient());
        assert!(RateError::PersistenceError(String::new()).is_transient());
        assert!(!RateError::MalformedResponse(String::new()).is_transient());
    }
}
