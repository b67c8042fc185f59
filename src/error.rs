//! Application error taxonomy
//!
//! Everything that can go wrong talking to the gym API collapses into
//! [`AppError`]. Screens never inspect the variants beyond
//! [`AppError::user_message`]: a server-provided message is shown verbatim,
//! everything else gets the screen's generic fallback.

use thiserror::Error;

/// Result alias for operations that surface an [`AppError`]
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Errors raised by the API client and the session context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// The server rejected the request and explained why
    #[error("{message}")]
    Application {
        /// Human-readable message from the response body
        message: String,
        /// HTTP status code of the rejection
        status: u16,
    },

    /// The server could not be reached (connect failure, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Anything else: malformed responses, unexpected statuses, local I/O
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Build an application error from a server message
    pub fn application(message: impl Into<String>, status: u16) -> Self {
        Self::Application {
            message: message.into(),
            status,
        }
    }

    /// Whether the server produced this error (as opposed to transport/local failures)
    pub const fn is_application(&self) -> bool {
        matches!(self, Self::Application { .. })
    }

    /// Text to show the user: the server's message, or `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Application { message, .. } => message.clone(),
            Self::Network(_) | Self::Unexpected(_) => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            Self::Network(e.to_string())
        } else if e.is_decode() {
            Self::Unexpected(format!("malformed response: {e}"))
        } else if e.is_request() {
            Self::Network(e.to_string())
        } else {
            Self::Unexpected(e.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::Unexpected(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::Unexpected(format!("malformed response: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_message_is_shown_verbatim() {
        let err = AppError::application("Invalid credentials.", 400);
        assert_eq!(err.user_message("fallback"), "Invalid credentials.");
        assert!(err.is_application());
    }

    #[test]
    fn test_other_errors_use_fallback() {
        let fallback = "Could not sign in, try again later.";
        assert_eq!(
            AppError::Network("connection refused".into()).user_message(fallback),
            fallback
        );
        assert_eq!(
            AppError::Unexpected("boom".into()).user_message(fallback),
            fallback
        );
    }
}
