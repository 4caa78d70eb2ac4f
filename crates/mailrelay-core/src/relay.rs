//! The mail relay client
//!
//! Every send is single-shot: authorize, build a transport session, submit
//! one message. Nothing is cached between sends and nothing is retried.

use crate::{RelayConfig, RelayError, RelayResult};
use async_trait::async_trait;
use mailrelay_auth::{CredentialStrategy, SessionCredential};
use mailrelay_smtp::{
    build_lettre_message, deliver, OutgoingMessage, SmtpAuth, SmtpClient, SmtpSession, Transport,
};
use tracing::{debug, error, info};

pub use mailrelay_smtp::SendReceipt as SendResult;

/// What a caller asks the relay to send
#[derive(Debug, Clone, Default)]
pub struct EmailRequest {
    /// Recipient addresses
    pub to: Vec<String>,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
}

/// Sends email on behalf of the HTTP layer
#[async_trait]
pub trait MailRelay: Send + Sync + 'static {
    /// Validate, authorize and send one message
    ///
    /// Validation happens before any network call.
    async fn relay(&self, request: EmailRequest) -> RelayResult<SendResult>;
}

/// Relays messages through the provider's SMTP server using a credential strategy
#[derive(Debug)]
pub struct MailRelayClient {
    strategy: CredentialStrategy,
    smtp: SmtpClient,
    from_name: Option<String>,
}

impl MailRelayClient {
    /// Create a client for the given strategy and relay
    pub fn new(strategy: CredentialStrategy, smtp: SmtpClient) -> Self {
        Self {
            strategy,
            smtp,
            from_name: None,
        }
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        let mut client = Self::new(config.strategy()?, config.smtp_client());
        if let Some(name) = config.from_name.as_deref().filter(|n| !n.trim().is_empty()) {
            client = client.from_name(name);
        }
        Ok(client)
    }

    /// Set the display name used on the From header
    pub fn from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = Some(name.into());
        self
    }

    pub fn strategy(&self) -> &CredentialStrategy {
        &self.strategy
    }

    /// Sender address
    pub fn account(&self) -> &str {
        self.strategy.account()
    }

    /// Turn a request into a message sent from the configured account
    pub fn compose(&self, request: EmailRequest) -> OutgoingMessage {
        let mut message = OutgoingMessage::new(self.account(), request.subject);
        message.from_name = self.from_name.clone();
        message.to = request.to;
        message.html_body = request.html;
        message.text_body = request.text;
        message
    }

    /// Produce an authorized transport session
    ///
    /// Incomplete credentials fail before any network call. With the OAuth2
    /// strategy this performs one token exchange per call.
    pub async fn acquire_transport(&self) -> RelayResult<SmtpSession> {
        let auth = match self.strategy.authorize().await? {
            SessionCredential::Password(creds) => SmtpAuth::Password {
                user: creds.account,
                password: creds.password,
            },
            SessionCredential::XOAuth2(token) => SmtpAuth::XOAuth2 {
                user: token.email().to_string(),
                access_token: token.access_token().to_string(),
            },
        };

        debug!(
            "Authorized {} via {} for {}:{}",
            self.account(),
            self.strategy.name(),
            self.smtp.host(),
            self.smtp.port()
        );

        Ok(self.smtp.session(auth)?)
    }

    /// Hand one message to a transport session
    pub async fn send(
        &self,
        transport: &dyn Transport,
        message: OutgoingMessage,
    ) -> RelayResult<SendResult> {
        Ok(deliver(transport, message).await?)
    }
}

#[async_trait]
impl MailRelay for MailRelayClient {
    async fn relay(&self, request: EmailRequest) -> RelayResult<SendResult> {
        let message = self.compose(request);
        message.validate()?;
        // The sender comes from the credentials, so those are checked before addresses are parsed
        self.strategy.validate()?;
        // A bad recipient never costs a token exchange
        build_lettre_message(&message)?;

        let result = match self.acquire_transport().await {
            Ok(transport) => self.send(&transport, message).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(sent) => info!("Relayed {} from {}", sent.message_id, self.account()),
            Err(RelayError::Validation(e)) => debug!("Rejected message: {}", e),
            Err(e) => error!("Relay from {} failed: {}", self.account(), e),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailrelay_auth::PasswordCredentials;

    fn client() -> MailRelayClient {
        let strategy = CredentialStrategy::StaticPassword(PasswordCredentials {
            account: "sender@gmail.com".to_string(),
            password: "app-pass".to_string(),
        });
        MailRelayClient::new(strategy, SmtpClient::gmail()).from_name("Relay Bot")
    }

    #[test]
    fn test_compose_stamps_sender() {
        let message = client().compose(EmailRequest {
            to: vec!["a@b.com".to_string()],
            subject: "Hi".to_string(),
            html: Some("<p>hi</p>".to_string()),
            text: None,
        });

        assert_eq!(message.from, "sender@gmail.com");
        assert_eq!(message.from_name.as_deref(), Some("Relay Bot"));
        assert_eq!(message.to, vec!["a@b.com".to_string()]);
        assert!(message.message_id.is_none());
    }

    #[tokio::test]
    async fn test_password_transport_needs_no_network() {
        assert!(client().acquire_transport().await.is_ok());
    }

    #[tokio::test]
    async fn test_relay_blames_missing_sender_on_configuration() {
        let strategy = CredentialStrategy::StaticPassword(PasswordCredentials {
            account: String::new(),
            password: "app-pass".to_string(),
        });
        let err = MailRelayClient::new(strategy, SmtpClient::gmail())
            .relay(EmailRequest {
                to: vec!["a@b.com".to_string()],
                subject: "Hi".to_string(),
                html: Some("<p>hi</p>".to_string()),
                text: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Configuration(ref m) if m.contains("account")));
    }

    #[tokio::test]
    async fn test_relay_rejects_incomplete_request() {
        let err = client()
            .relay(EmailRequest {
                to: vec!["a@b.com".to_string()],
                ..Default::default()
            })
            .await
            .unwrap_err();

        match err {
            RelayError::Validation(message) => {
                assert!(message.contains("subject"));
                assert!(message.contains("body"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
