//! Error types for the relay

use thiserror::Error;

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Everything that can go wrong between receiving a send request and the
/// provider accepting the message
#[derive(Debug, Error)]
pub enum RelayError {
    /// Required configuration is missing or malformed
    #[error("Configuration incomplete: {0}")]
    Configuration(String),

    /// The message is missing a recipient, subject or body, or has a bad address
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Caller did not present the shared secret
    #[error("Unauthorized")]
    Unauthorized,

    /// The provider refused to exchange the refresh token
    #[error("Provider authentication failed: {0}")]
    ProviderAuth(String),

    /// The relay rejected the message or could not be reached
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

impl From<mailrelay_auth::AuthError> for RelayError {
    fn from(e: mailrelay_auth::AuthError) -> Self {
        if e.is_config() {
            RelayError::Configuration(e.to_string())
        } else {
            RelayError::ProviderAuth(e.to_string())
        }
    }
}

impl From<mailrelay_smtp::SmtpError> for RelayError {
    fn from(e: mailrelay_smtp::SmtpError) -> Self {
        if e.is_config() {
            RelayError::Configuration(e.to_string())
        } else if e.is_invalid_input() {
            RelayError::Validation(e.to_string())
        } else {
            RelayError::Delivery(e.to_string())
        }
    }
}

impl From<config::ConfigError> for RelayError {
    fn from(e: config::ConfigError) -> Self {
        RelayError::Configuration(e.to_string())
    }
}
