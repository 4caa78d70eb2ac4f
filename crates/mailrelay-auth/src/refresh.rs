//! OAuth2 refresh-token exchange
//!
//! The relay never runs an interactive authorization flow. It holds a long-lived
//! refresh token and trades it for a short-lived access token before every session.

use crate::{AuthError, AuthResult};
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, ClientId, ClientSecret,
    RefreshToken, RequestTokenError, TokenResponse, TokenUrl,
};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound on a token endpoint round trip
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth2 provider endpoints
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Scopes requested on refresh (empty keeps the originally granted scopes)
    pub scopes: Vec<String>,
}

/// Long-lived OAuth2 credentials for the sending account
#[derive(Clone)]
pub struct OAuth2Credentials {
    /// OAuth2 client ID
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Refresh token issued for `account`
    pub refresh_token: String,
    /// Sender address the token was issued for
    pub account: String,
}

impl fmt::Debug for OAuth2Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("account", &self.account)
            .finish()
    }
}

impl OAuth2Credentials {
    /// Check that every field needed for a refresh is present
    pub fn validate(&self) -> AuthResult<()> {
        let missing: Vec<&str> = [
            ("account", &self.account),
            ("refresh token", &self.refresh_token),
            ("client id", &self.client_id),
            ("client secret", &self.client_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AuthError::InvalidConfig(format!(
                "missing OAuth2 {}",
                missing.join(", ")
            )))
        }
    }
}

/// Token pair containing access and refresh tokens
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenPair {
    /// Access token for API calls
    pub access_token: String,
    /// Refresh token for obtaining new access tokens
    pub refresh_token: Option<String>,
    /// Token expiration timestamp (Unix seconds), informational only
    pub expires_at: Option<i64>,
}

/// Exchanges a stored refresh token for access tokens
pub struct RefreshFlow {
    credentials: OAuth2Credentials,
    client: BasicClient,
    scopes: Vec<String>,
    timeout: Duration,
}

impl fmt::Debug for RefreshFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshFlow")
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RefreshFlow {
    /// Create a refresh flow against the given provider endpoints
    pub fn new(config: OAuth2Config, credentials: OAuth2Credentials) -> AuthResult<Self> {
        let auth_url = AuthUrl::new(config.auth_url.clone())
            .map_err(|e| AuthError::InvalidConfig(format!("Invalid auth URL: {}", e)))?;
        let token_url = TokenUrl::new(config.token_url.clone())
            .map_err(|e| AuthError::InvalidConfig(format!("Invalid token URL: {}", e)))?;

        let client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        Ok(Self {
            credentials,
            client,
            scopes: config.scopes,
            timeout: DEFAULT_TOKEN_TIMEOUT,
        })
    }

    /// Bound the token endpoint round trip
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The stored credentials
    pub fn credentials(&self) -> &OAuth2Credentials {
        &self.credentials
    }

    /// Refresh the access token using the stored refresh token
    pub async fn refresh(&self) -> AuthResult<TokenPair> {
        self.credentials.validate()?;

        let refresh_token = RefreshToken::new(self.credentials.refresh_token.clone());
        let mut request = self.client.exchange_refresh_token(&refresh_token);
        for scope in &self.scopes {
            request = request.add_scope(oauth2::Scope::new(scope.clone()));
        }

        debug!("Requesting access token for {}", self.credentials.account);

        let exchange = request.request_async(async_http_client);
        let token_response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                warn!("Token endpoint did not answer within {:?}", self.timeout);
                AuthError::Timeout(self.timeout)
            })?
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(response) => {
                    AuthError::TokenExchangeFailed(response.to_string())
                }
                RequestTokenError::Request(e) => AuthError::NetworkError(e.to_string()),
                other => AuthError::TokenExchangeFailed(other.to_string()),
            })?;

        let expires_at = token_response.expires_in().map(|duration| {
            chrono::Utc::now().timestamp() + duration.as_secs() as i64
        });

        info!("Obtained access token for {}", self.credentials.account);

        Ok(TokenPair {
            access_token: token_response.access_token().secret().clone(),
            refresh_token: token_response
                .refresh_token()
                .map(|t| t.secret().clone())
                .or_else(|| Some(self.credentials.refresh_token.clone())),
            expires_at,
        })
    }
}
