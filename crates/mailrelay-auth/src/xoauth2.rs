//! XOAUTH2 SASL credential for SMTP
//!
//! Implements the XOAUTH2 authentication mechanism as specified at:
//! https://developers.google.com/workspace/gmail/imap/xoauth2-protocol

use std::fmt;

/// XOAUTH2 token for SMTP authentication
#[derive(Clone)]
pub struct XOAuth2Token {
    /// Email address
    email: String,
    /// OAuth2 access token
    access_token: String,
}

impl fmt::Debug for XOAuth2Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XOAuth2Token")
            .field("email", &self.email)
            .field("access_token", &"[redacted]")
            .finish()
    }
}

impl XOAuth2Token {
    /// Create a new XOAUTH2 token
    pub fn new(email: &str, access_token: &str) -> Self {
        Self {
            email: email.to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// Get the email address
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Get the access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}
