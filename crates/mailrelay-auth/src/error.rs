//! Error types for the auth module

use std::time::Duration;
use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur while authorizing a mail session
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token exchange was rejected by the provider (expired or revoked refresh token,
    /// unknown client, ...)
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Token endpoint did not answer in time
    #[error("Token exchange timed out after {0:?}")]
    Timeout(Duration),

    /// Network error while talking to the token endpoint
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Invalid or incomplete configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AuthError {
    /// Whether the error was caused by local configuration rather than the provider
    pub fn is_config(&self) -> bool {
        matches!(self, AuthError::InvalidConfig(_))
    }
}
