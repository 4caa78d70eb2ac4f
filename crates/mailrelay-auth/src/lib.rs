//! Authentication module for MailRelay
//!
//! Provides the two ways the relay can log in to the provider's SMTP server:
//! 1. Static application password (PLAIN/LOGIN)
//! 2. OAuth2 refresh token, exchanged for a fresh access token per session (XOAUTH2)

mod error;
mod refresh;
mod strategy;
mod xoauth2;

pub use error::{AuthError, AuthResult};
pub use refresh::{
    OAuth2Config, OAuth2Credentials, RefreshFlow, TokenPair, DEFAULT_TOKEN_TIMEOUT,
};
pub use strategy::{CredentialStrategy, PasswordCredentials, SessionCredential};
pub use xoauth2::XOAuth2Token;

/// Gmail OAuth2 configuration
pub mod gmail {
    use super::OAuth2Config;

    /// Google authorization endpoint
    pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

    /// Google token endpoint
    pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

    /// Gmail SMTP server
    pub const SMTP_HOST: &str = "smtp.gmail.com";
    pub const SMTP_PORT: u16 = 587;

    /// Create Gmail OAuth2 configuration
    ///
    /// Refresh requests keep the scopes granted at consent time, so none are sent.
    pub fn oauth2_config() -> OAuth2Config {
        OAuth2Config {
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            scopes: Vec::new(),
        }
    }
}
