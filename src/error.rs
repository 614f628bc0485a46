//! Error types for pipeline controller operations

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error taxonomy for the background-removal pipeline
///
/// No variant is fatal to the process: every failure resolves the controller
/// back to `Idle` and the user may retry by resubmitting.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format or decoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Non-image payload submitted to the pipeline, rejected before invocation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// External background-removal capability failure
    #[error("Capability error: {0}")]
    Capability(String),

    /// Capability produced a result that cannot be normalized into a
    /// displayable reference
    #[error("Unrecognized result: {0}")]
    UnrecognizedResult(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An in-flight request was superseded or torn down before completing
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl PipelineError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new capability error
    pub fn capability<S: Into<String>>(msg: S) -> Self {
        Self::Capability(msg.into())
    }

    /// Create a new unrecognized result error
    pub fn unrecognized_result<S: Into<String>>(msg: S) -> Self {
        Self::UnrecognizedResult(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new cancellation error
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a capability error carrying transport context
    pub fn transport_error(operation: &str, error: &reqwest::Error) -> Self {
        Self::Capability(format!("{operation} failed: {error}"))
    }

    /// Create a configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {parameter}: {value} (valid range: {valid_range})"
        ))
    }

    /// Whether this error leaves the controller able to accept a resubmission
    ///
    /// Always true today; kept as an explicit statement of the recovery
    /// contract so callers do not have to reason about individual variants.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PipelineError::invalid_input("payload is not an image");
        assert!(matches!(err, PipelineError::InvalidInput(_)));

        let err = PipelineError::unrecognized_result("empty buffer");
        assert!(matches!(err, PipelineError::UnrecognizedResult(_)));
    }

    #[test]
    fn test_error_display() {
        let err = PipelineError::capability("model rejected the image");
        assert_eq!(err.to_string(), "Capability error: model rejected the image");

        let err = PipelineError::config_value_error("progress_ceiling", 150, "1-99");
        let text = err.to_string();
        assert!(text.contains("progress_ceiling"));
        assert!(text.contains("150"));
        assert!(text.contains("1-99"));
    }

    #[test]
    fn test_every_error_is_recoverable() {
        let errors = [
            PipelineError::invalid_input("x"),
            PipelineError::capability("x"),
            PipelineError::unrecognized_result("x"),
            PipelineError::invalid_config("x"),
            PipelineError::cancelled("x"),
        ];
        for err in errors {
            assert!(err.is_recoverable());
        }
    }
}
