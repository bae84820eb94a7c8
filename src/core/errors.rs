use thiserror::Error;

/// Unified error type for the duplicate-detection engine.
///
/// Degraded-capability conditions (embedding backend or TF-IDF corpus fit
/// unavailable) are deliberately NOT represented here: they reduce precision
/// but never fail a run, and are surfaced as flags on the
/// [`DetectionReport`](crate::record::DetectionReport) instead.
#[derive(Debug, Error)]
pub enum DedupError {
    /// Invalid configuration, rejected before any work begins
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
        expected: Option<String>,
        actual: Option<String>,
    },

    /// Detection exceeded its deadline; no partial results are surfaced
    #[error("Detection timed out: {operation} (timeout: {timeout_ms}ms)")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Detection was cancelled cooperatively before completion
    #[error("Detection was cancelled: {operation}")]
    Cancelled {
        operation: String,
        reason: Option<String>,
    },

    /// Invariant violations inside the engine
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DedupError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            field: None,
            expected: None,
            actual: None,
        }
    }

    /// Create a configuration error naming the offending field
    pub fn configuration_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
            expected: None,
            actual: None,
        }
    }

    /// Attach expected/actual values to a configuration error
    pub fn with_expectation<E: Into<String>, A: Into<String>>(
        mut self,
        expected_value: E,
        actual_value: A,
    ) -> Self {
        if let Self::Configuration {
            ref mut expected,
            ref mut actual,
            ..
        } = self
        {
            *expected = Some(expected_value.into());
            *actual = Some(actual_value.into());
        }
        self
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Create a cancellation error
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
            reason: None,
        }
    }

    /// Create a cancellation error with a reason
    pub fn cancelled_with_reason<S: Into<String>, R: Into<String>>(operation: S, reason: R) -> Self {
        Self::Cancelled {
            operation: operation.into(),
            reason: Some(reason.into()),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Check if error is recoverable: the caller may retry detection or fall
    /// back to a no-detection pass with the original records intact
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Cancelled { .. } => true,
            Self::Configuration { .. } => false,
            Self::Internal { .. } => false,
        }
    }

    /// Get error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled { .. } => "cancelled",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DedupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = DedupError::configuration("threshold out of range");
        assert!(matches!(err, DedupError::Configuration { .. }));
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn test_configuration_expectation() {
        let err = DedupError::configuration_field("threshold out of range", "threshold")
            .with_expectation("0.0..=1.0", "1.5");

        if let DedupError::Configuration {
            field,
            expected,
            actual,
            ..
        } = err
        {
            assert_eq!(field.as_deref(), Some("threshold"));
            assert_eq!(expected.as_deref(), Some("0.0..=1.0"));
            assert_eq!(actual.as_deref(), Some("1.5"));
        } else {
            panic!("Expected configuration error");
        }
    }

    #[test]
    fn test_error_recoverability() {
        assert!(DedupError::timeout("detect", 1000).is_recoverable());
        assert!(DedupError::cancelled("detect").is_recoverable());
        assert!(!DedupError::configuration("bad").is_recoverable());
        assert!(!DedupError::internal("broken").is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = DedupError::timeout("detect", 5000);
        assert_eq!(
            err.to_string(),
            "Detection timed out: detect (timeout: 5000ms)"
        );
    }
}
