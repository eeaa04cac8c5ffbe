//! Error taxonomy for one identification attempt.
//!
//! Every variant ends the current attempt but never the session; the UI
//! surfaces `to_string()` and the user can retry or reset.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum IdentifyError {
    /// Wrong MIME type or oversize file
    InvalidFile(String),
    /// File could not be read or decoded
    ReadFailure(String),
    /// Request rejected, timed out, non-2xx or unparseable response
    NetworkFailure { status: Option<u16>, message: String },
    /// Well-formed response with `success: false`
    ServerFailure(String),
    /// Failure caught at the worker boundary
    Unexpected(String),
}

impl IdentifyError {
    pub fn network(message: impl Into<String>) -> Self {
        IdentifyError::NetworkFailure { status: None, message: message.into() }
    }

    /// Short title for the error banner
    pub fn title(&self) -> &'static str {
        match self {
            IdentifyError::InvalidFile(_) => "Invalid file",
            IdentifyError::ReadFailure(_) => "Could not read image",
            IdentifyError::NetworkFailure { .. } => "Identification failed",
            IdentifyError::ServerFailure(_) => "Identification failed",
            IdentifyError::Unexpected(_) => "Unexpected error",
        }
    }
}

impl fmt::Display for IdentifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifyError::InvalidFile(msg)
            | IdentifyError::ReadFailure(msg)
            | IdentifyError::ServerFailure(msg)
            | IdentifyError::Unexpected(msg) => write!(f, "{}", msg),
            IdentifyError::NetworkFailure { status: Some(code), message } if message.is_empty() => {
                write!(f, "HTTP error! status: {}", code)
            }
            IdentifyError::NetworkFailure { status: Some(code), message } => {
                write!(f, "HTTP error! status: {} ({})", code, message)
            }
            IdentifyError::NetworkFailure { status: None, message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for IdentifyError {}

impl From<reqwest::Error> for IdentifyError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            format!("Could not reach the prediction service: {}", err)
        } else {
            err.to_string()
        };
        IdentifyError::NetworkFailure {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }
}

impl From<image::ImageError> for IdentifyError {
    fn from(err: image::ImageError) -> Self {
        IdentifyError::ReadFailure(format!("Could not decode image: {}", err))
    }
}

impl From<std::io::Error> for IdentifyError {
    fn from(err: std::io::Error) -> Self {
        IdentifyError::ReadFailure(format!("Could not read file: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_verbatim() {
        let err = IdentifyError::ServerFailure("model unavailable".into());
        assert_eq!(err.to_string(), "model unavailable");
    }

    #[test]
    fn network_failure_mentions_status() {
        let err = IdentifyError::NetworkFailure { status: Some(503), message: String::new() };
        assert_eq!(err.to_string(), "HTTP error! status: 503");

        let err = IdentifyError::NetworkFailure { status: Some(400), message: "Missing image data".into() };
        assert_eq!(err.to_string(), "HTTP error! status: 400 (Missing image data)");
    }

    #[test]
    fn io_errors_are_read_failures() {
        let err: IdentifyError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, IdentifyError::ReadFailure(_)));
    }
}
