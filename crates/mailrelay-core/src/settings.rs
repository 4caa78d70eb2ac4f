//! Process configuration
//!
//! Loaded once at startup from the environment (after an optional `.env`
//! file) and never mutated afterwards.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EMAIL_USER` | | Sender address, also the SMTP login |
//! | `EMAIL_PASS` | | Application password (password strategy) |
//! | `CLIENT_ID` / `CLIENT_SECRET` / `REFRESH_TOKEN` | | OAuth2 credentials (oauth2 strategy) |
//! | `MAIL_AUTH` | inferred | `password` or `oauth2` |
//! | `EMAIL_FROM_NAME` | | Display name on the From header |
//! | `EMAIL_API_KEY` | | Shared secret for the `Authorization: Bearer` check |
//! | `SMTP_HOST` / `SMTP_PORT` | `smtp.gmail.com` / 587 | Relay endpoint |
//! | `SMTP_TIMEOUT_SECS` | 30 | Connect, socket and token endpoint timeout |
//! | `AUTH_URL` / `TOKEN_URL` | Google | OAuth2 endpoints |
//! | `LISTEN_HOST` / `PORT` | `0.0.0.0` / 5000 | HTTP listener |

use crate::RelayResult;
use mailrelay_auth::{
    gmail, CredentialStrategy, OAuth2Config, OAuth2Credentials, PasswordCredentials, RefreshFlow,
};
use mailrelay_smtp::SmtpClient;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Which credential strategy to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    Password,
    #[serde(alias = "oauth")]
    OAuth2,
}

/// Relay configuration
#[derive(Clone, Deserialize)]
pub struct RelayConfig {
    /// Sender address
    #[serde(rename = "email_user", default)]
    pub account: String,

    /// Application password
    #[serde(rename = "email_pass")]
    pub password: Option<String>,

    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,

    /// Explicit strategy; inferred from the credentials present when unset
    #[serde(rename = "mail_auth")]
    pub auth: Option<AuthKind>,

    /// Display name on the From header
    #[serde(rename = "email_from_name")]
    pub from_name: Option<String>,

    /// Shared secret callers must present as a Bearer token
    #[serde(rename = "email_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default = "default_timeout_secs")]
    pub smtp_timeout_secs: u64,

    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_listen_host")]
    pub listen_host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_smtp_host() -> String {
    gmail::SMTP_HOST.to_string()
}

fn default_smtp_port() -> u16 {
    gmail::SMTP_PORT
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_auth_url() -> String {
    gmail::AUTH_URL.to_string()
}

fn default_token_url() -> String {
    gmail::TOKEN_URL.to_string()
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |value: &Option<String>| present(value).map(|_| "[set]");
        f.debug_struct("RelayConfig")
            .field("account", &self.account)
            .field("password", &set(&self.password))
            .field("client_id", &self.client_id)
            .field("client_secret", &set(&self.client_secret))
            .field("refresh_token", &set(&self.refresh_token))
            .field("auth", &self.auth)
            .field("from_name", &self.from_name)
            .field("api_key", &set(&self.api_key))
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_timeout_secs", &self.smtp_timeout_secs)
            .field("token_url", &self.token_url)
            .field("listen_host", &self.listen_host)
            .field("port", &self.port)
            .finish()
    }
}

impl RelayConfig {
    /// Load from `.env` (if present) and the process environment
    pub fn from_env() -> RelayResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_environment(config::Environment::default())
    }

    /// Load from an explicit environment source
    pub fn from_environment(source: config::Environment) -> RelayResult<Self> {
        let c = config::Config::builder().add_source(source).build()?;
        Ok(c.try_deserialize()?)
    }

    /// Strategy named by `MAIL_AUTH`, or inferred: a refresh token means OAuth2
    pub fn auth_kind(&self) -> AuthKind {
        self.auth.unwrap_or_else(|| {
            if present(&self.refresh_token).is_some() {
                AuthKind::OAuth2
            } else {
                AuthKind::Password
            }
        })
    }

    /// Timeout applied to the token endpoint and the SMTP session
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.smtp_timeout_secs)
    }

    /// Shared secret, if one is configured
    pub fn api_key(&self) -> Option<&str> {
        present(&self.api_key)
    }

    /// Build the credential strategy
    ///
    /// Missing credentials are not rejected here; they surface as a
    /// configuration error on the first send.
    pub fn strategy(&self) -> RelayResult<CredentialStrategy> {
        let account = self.account.trim().to_string();
        let value = |v: &Option<String>| present(v).unwrap_or_default().to_string();

        let strategy = match self.auth_kind() {
            AuthKind::Password => CredentialStrategy::StaticPassword(PasswordCredentials {
                account,
                // app passwords are shown with spaces; keep them verbatim
                password: self.password.clone().unwrap_or_default(),
            }),
            AuthKind::OAuth2 => {
                let endpoints = OAuth2Config {
                    auth_url: self.auth_url.clone(),
                    token_url: self.token_url.clone(),
                    scopes: Vec::new(),
                };
                let credentials = OAuth2Credentials {
                    client_id: value(&self.client_id),
                    client_secret: value(&self.client_secret),
                    refresh_token: value(&self.refresh_token),
                    account,
                };
                CredentialStrategy::OAuth2Refresh(
                    RefreshFlow::new(endpoints, credentials)?.timeout(self.timeout()),
                )
            }
        };

        Ok(strategy)
    }

    /// Build the SMTP client for the configured relay
    pub fn smtp_client(&self) -> SmtpClient {
        SmtpClient::new(self.smtp_host.clone(), self.smtp_port).timeout(self.timeout())
    }

    /// Address the HTTP listener binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.port)
    }
}
