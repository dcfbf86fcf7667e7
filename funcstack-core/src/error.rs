//! Handler-facing error type

use thiserror::Error;

/// Error raised by handler code.
///
/// Carries an optional HTTP status code; without one the processor maps the
/// error to a 500 response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
    pub status_code: Option<u16>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HandlerError::new("some error");
        assert_eq!(err.to_string(), "some error");
        assert_eq!(err.status_code, None);
    }

    #[test]
    fn test_error_with_status() {
        let err = HandlerError::new("not found").with_status(404);
        assert_eq!(err.status_code, Some(404));
        assert_eq!(err.to_string(), "not found");
    }

    #[test]
    fn test_error_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = HandlerError::from(json_err);
        assert!(!err.message.is_empty());
        assert_eq!(err.status_code, None);
    }
}
