//! Listener setup and graceful shutdown

use axum::Router;
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{error, info};

/// Serve `router` until Ctrl+C or SIGTERM
pub async fn serve<A: ToSocketAddrs>(addr: A, router: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    if let Ok(local) = listener.local_addr() {
        info!("Listening on http://{}", local);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down");
}
