//! MailRelay - relay email over SMTP with an app password or OAuth2
//!
//! Reads its configuration from the environment (and `.env`), then serves
//! `POST /send-email`.

use mailrelay_core::{MailRelayClient, RelayConfig};
use mailrelay_server::{router, serve, AppState};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("mailrelay=debug".parse()?))
        .init();

    let config = RelayConfig::from_env()?;
    let client = MailRelayClient::from_config(&config)?;

    // Keep serving with incomplete credentials; each send reports the problem
    if let Err(e) = client.strategy().validate() {
        tracing::error!("Credentials incomplete, sends will fail: {}", e);
    }
    if config.api_key().is_none() {
        tracing::warn!("EMAIL_API_KEY is not set, the send endpoint is open to anyone");
    }

    tracing::info!(
        "Starting MailRelay as {} ({} strategy)",
        client.account(),
        client.strategy().name()
    );

    let state = AppState::new(Arc::new(client), config.api_key());
    serve(config.listen_addr(), router(state)).await?;

    Ok(())
}
