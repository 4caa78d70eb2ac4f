//! Credential strategies
//!
//! A strategy is chosen once at startup and turns the process-lifetime
//! credentials into something a single SMTP session can log in with.

use crate::{AuthError, AuthResult, RefreshFlow, XOAuth2Token};
use std::fmt;
use tracing::debug;

/// Static application-password credentials
#[derive(Clone)]
pub struct PasswordCredentials {
    /// Sender address, also the SMTP username
    pub account: String,
    /// Application password
    pub password: String,
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("account", &self.account)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Credential handed to one SMTP session
#[derive(Debug, Clone)]
pub enum SessionCredential {
    /// Username and password for PLAIN/LOGIN
    Password(PasswordCredentials),
    /// Fresh access token for XOAUTH2
    XOAuth2(XOAuth2Token),
}

/// How the relay authenticates against the mail provider
#[derive(Debug)]
pub enum CredentialStrategy {
    /// Application password, no token exchange
    StaticPassword(PasswordCredentials),
    /// Refresh token exchanged for an access token before every session
    OAuth2Refresh(RefreshFlow),
}

impl CredentialStrategy {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            CredentialStrategy::StaticPassword(_) => "password",
            CredentialStrategy::OAuth2Refresh(_) => "oauth2",
        }
    }

    /// Sender address
    pub fn account(&self) -> &str {
        match self {
            CredentialStrategy::StaticPassword(creds) => &creds.account,
            CredentialStrategy::OAuth2Refresh(flow) => &flow.credentials().account,
        }
    }

    /// Check that the credentials are complete. Makes no network call.
    pub fn validate(&self) -> AuthResult<()> {
        match self {
            CredentialStrategy::StaticPassword(creds) => {
                let mut missing = Vec::new();
                if creds.account.trim().is_empty() {
                    missing.push("account");
                }
                if creds.password.is_empty() {
                    missing.push("password");
                }
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(AuthError::InvalidConfig(format!(
                        "missing {}",
                        missing.join(", ")
                    )))
                }
            }
            CredentialStrategy::OAuth2Refresh(flow) => flow.credentials().validate(),
        }
    }

    /// Produce a credential for one SMTP session
    ///
    /// For `OAuth2Refresh` this performs one token exchange; the resulting access
    /// token is not cached.
    pub async fn authorize(&self) -> AuthResult<SessionCredential> {
        self.validate()?;

        match self {
            CredentialStrategy::StaticPassword(creds) => {
                debug!("Using app password for {}", creds.account);
                Ok(SessionCredential::Password(creds.clone()))
            }
            CredentialStrategy::OAuth2Refresh(flow) => {
                let tokens = flow.refresh().await?;
                Ok(SessionCredential::XOAuth2(XOAuth2Token::new(
                    &flow.credentials().account,
                    &tokens.access_token,
                )))
            }
        }
    }
}
