//! SMTP client implementation

use crate::{build_lettre_message, OutgoingMessage, SmtpError, SmtpResult};
use async_trait::async_trait;
use lettre::{
    transport::smtp::authentication::{Credentials, Mechanism},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound on connection establishment and socket inactivity
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How a session logs in to the SMTP server
#[derive(Clone)]
pub enum SmtpAuth {
    /// PLAIN/LOGIN with an application password
    Password { user: String, password: String },
    /// XOAUTH2 with a short-lived access token
    XOAuth2 { user: String, access_token: String },
}

impl fmt::Debug for SmtpAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmtpAuth::Password { user, .. } => {
                f.debug_struct("Password").field("user", user).finish_non_exhaustive()
            }
            SmtpAuth::XOAuth2 { user, .. } => {
                f.debug_struct("XOAuth2").field("user", user).finish_non_exhaustive()
            }
        }
    }
}

/// What the relay answered for an accepted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Message-ID the relay accepted
    pub message_id: String,
    /// Final SMTP reply, e.g. "250 2.0.0 OK ..."
    pub response: String,
}

/// Anything that can hand a built message to a relay
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit one message and return the relay's reply text
    async fn submit(&self, message: Message) -> SmtpResult<String>;
}

/// SMTP client for sending emails
#[derive(Debug, Clone)]
pub struct SmtpClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SmtpClient {
    /// Create a new SMTP client
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a Gmail SMTP client
    pub fn gmail() -> Self {
        Self::new("smtp.gmail.com", 587)
    }

    /// Bound connection establishment and socket inactivity
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Build an authenticated session
    ///
    /// No connection is opened until the first message is submitted. Port 465
    /// uses implicit TLS, every other port upgrades with STARTTLS.
    pub fn session(&self, auth: SmtpAuth) -> SmtpResult<SmtpSession> {
        let builder = if self.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
        }
        .map_err(|e| SmtpError::ConnectionFailed(e.to_string()))?;

        // lettre's Xoauth2 mechanism expects the access token directly -
        // it constructs and encodes the XOAUTH2 string internally
        let (credentials, mechanisms) = match auth {
            SmtpAuth::Password { user, password } => (
                Credentials::new(user, password),
                vec![Mechanism::Plain, Mechanism::Login],
            ),
            SmtpAuth::XOAuth2 { user, access_token } => (
                Credentials::new(user, access_token),
                vec![Mechanism::Xoauth2],
            ),
        };

        let transport = builder
            .port(self.port)
            .timeout(Some(self.timeout))
            .credentials(credentials)
            .authentication(mechanisms)
            .build();

        debug!(
            "Built SMTP session for {}:{} (timeout {:?})",
            self.host, self.port, self.timeout
        );

        Ok(SmtpSession { transport })
    }
}

/// One authenticated transport to the relay
pub struct SmtpSession {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl fmt::Debug for SmtpSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSession").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for SmtpSession {
    async fn submit(&self, message: Message) -> SmtpResult<String> {
        let response = self.transport.send(message).await.map_err(|e| {
            warn!("SMTP relay rejected message: {}", e);
            SmtpError::from(e)
        })?;

        Ok(format!(
            "{} {}",
            response.code(),
            response.message().collect::<Vec<_>>().join(" ")
        ))
    }
}

/// Records messages instead of sending them
#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl Transport for lettre::transport::stub::AsyncStubTransport {
    async fn submit(&self, message: Message) -> SmtpResult<String> {
        self.send(message)
            .await
            .map_err(|e| SmtpError::SendFailed(e.to_string()))?;
        Ok("250 OK (stub)".to_string())
    }
}

/// Validate, stamp and submit one message
pub async fn deliver(
    transport: &dyn Transport,
    mut message: OutgoingMessage,
) -> SmtpResult<SendReceipt> {
    message.validate()?;

    let message_id = match message.message_id.clone() {
        Some(id) => id,
        None => message.assign_message_id()?.to_string(),
    };

    let lettre_message = build_lettre_message(&message)?;
    info!("Sending email {} to {:?}", message_id, message.to);

    let response = transport.submit(lettre_message).await?;

    info!("Email {} accepted: {}", message_id, response);
    Ok(SendReceipt {
        message_id,
        response,
    })
}
