//! Check that a stored refresh token can still be exchanged
//!
//! Run with: CLIENT_ID=... CLIENT_SECRET=... REFRESH_TOKEN=... EMAIL_USER=... \
//!     cargo run -p mailrelay-auth --example refresh_token

use mailrelay_auth::{gmail, OAuth2Credentials, RefreshFlow};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run_test())
}

async fn run_test() -> anyhow::Result<()> {
    let var = |name: &str| std::env::var(name).unwrap_or_default();

    let credentials = OAuth2Credentials {
        client_id: var("CLIENT_ID"),
        client_secret: var("CLIENT_SECRET"),
        refresh_token: var("REFRESH_TOKEN"),
        account: var("EMAIL_USER"),
    };

    println!("Testing refresh token for {}...\n", credentials.account);

    let flow = RefreshFlow::new(gmail::oauth2_config(), credentials)?;

    match flow.refresh().await {
        Ok(tokens) => {
            println!("  SUCCESS: Got access token ({} chars)", tokens.access_token.len());
            match tokens.expires_at {
                Some(expires_at) => println!("  Expires at: {} (unix)", expires_at),
                None => println!("  Expiry not reported"),
            }
        }
        Err(e) => {
            println!("  FAILED: {}", e);
        }
    }

    Ok(())
}
