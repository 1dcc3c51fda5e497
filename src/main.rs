//! Server entry point

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;

use keel_api::{create_app, init_tracing, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before reading configuration
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_tracing(&config.logging);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let environment = config.server.environment.clone();
    let docs_enabled = config.server.enable_docs;

    let app = create_app(config).await?;

    let shutdown_token = CancellationToken::new();
    tokio::spawn(shutdown_signal_listener(shutdown_token.clone()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment, "Server listening");
    if docs_enabled {
        tracing::info!("API docs available at http://{}/docs", addr);
    }

    axum::serve(
        listener,
        app.router
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
    .await?;

    tracing::info!("Server shut down cleanly");
    Ok(())
}

/// Cancel the token on SIGINT or SIGTERM so in-flight requests drain
async fn shutdown_signal_listener(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }

    token.cancel();
}
