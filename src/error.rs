//! Error types for the session client.
//!
//! One crate-wide enum covering the failure modes of token inspection,
//! refresh, the credential store, and the authenticated HTTP client.

use thiserror::Error;

/// Error type for session client operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Access token could not be decoded
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// No refresh token is available for the current session
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// The refresh endpoint rejected the request
    #[error("Token refresh rejected: {0}")]
    RefreshRejected(String),

    /// The refresh call exceeded its deadline
    #[error("Token refresh timed out after {0:?}")]
    RefreshTimeout(std::time::Duration),

    /// A request was rejected with 401 after its single retry
    #[error("Unauthorized after retry: {path}")]
    Unauthorized {
        /// Request path that was rejected twice
        path: String,
    },

    /// Credential store failure
    #[error("Credential store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Create a malformed-token error with the given message.
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedToken(msg.into())
    }

    /// Create a refresh-rejected error with the given message.
    #[must_use]
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::RefreshRejected(msg.into())
    }

    /// Create a store error with the given message.
    #[must_use]
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error with the given message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check whether this error means the session is unrecoverable
    /// locally and should be terminated.
    ///
    /// A missing refresh token and a post-retry 401 cannot be recovered
    /// from by this client; everything else is either transient or the
    /// caller's decision.
    #[must_use]
    pub const fn requires_termination(&self) -> bool {
        matches!(self, Self::MissingRefreshToken | Self::Unauthorized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_termination() {
        assert!(SessionError::MissingRefreshToken.requires_termination());
        assert!(SessionError::Unauthorized {
            path: "/api/bookings".to_string()
        }
        .requires_termination());

        assert!(!SessionError::rejected("invalid token").requires_termination());
        assert!(!SessionError::config("bad url").requires_termination());
    }

    #[test]
    fn test_display_messages() {
        let err = SessionError::rejected("refresh token revoked");
        assert_eq!(err.to_string(), "Token refresh rejected: refresh token revoked");

        let err = SessionError::RefreshTimeout(std::time::Duration::from_secs(10));
        assert!(err.to_string().contains("10s"));
    }
}
