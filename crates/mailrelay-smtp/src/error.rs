//! Error types for SMTP operations

use thiserror::Error;

/// Result type for SMTP operations
pub type SmtpResult<T> = Result<T, SmtpError>;

/// Errors that can occur during SMTP operations
#[derive(Debug, Error)]
pub enum SmtpError {
    /// Connection failed
    #[error("Failed to connect to SMTP server: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("SMTP authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to send message
    #[error("Failed to send message: {0}")]
    SendFailed(String),

    /// Server did not answer in time
    #[error("SMTP server timed out: {0}")]
    Timeout(String),

    /// Invalid recipient address
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The configured sender address does not parse
    #[error("Invalid sender address: {0}")]
    InvalidSender(String),

    /// Message is missing a required part
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Message building error
    #[error("Failed to build message: {0}")]
    MessageBuildError(String),
}

impl SmtpError {
    /// Whether the error is the caller's fault rather than the relay's
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            SmtpError::InvalidAddress(_) | SmtpError::InvalidMessage(_)
        )
    }

    /// Whether the error comes from the relay's own settings
    pub fn is_config(&self) -> bool {
        matches!(self, SmtpError::InvalidSender(_))
    }
}

impl From<lettre::transport::smtp::Error> for SmtpError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        if e.is_timeout() {
            return SmtpError::Timeout(e.to_string());
        }
        // 530/534/535: authentication required, rejected or not accepted
        if let Some(code) = e.status() {
            if code.to_string().starts_with("53") {
                return SmtpError::AuthenticationFailed(e.to_string());
            }
        }
        SmtpError::SendFailed(e.to_string())
    }
}
