use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use invite_mailer::api;
use invite_mailer::assignments::XlsxAssignmentRepository;
use invite_mailer::auth::MicrosoftIdentity;
use invite_mailer::config::Config;
use invite_mailer::mail::GraphMailer;
use invite_mailer::session::InMemorySessionStore;
use invite_mailer::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging (LOG_FORMAT=json for structured output)
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with((!json_logs).then(|| fmt::layer()))
        .with(json_logs.then(|| fmt::layer().json()))
        .with(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting invite mailer...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        host = %config.server_host,
        port = %config.server_port,
        recipients = %config.recipients_file.display(),
        "Configuration loaded"
    );

    if !config.attachment_file.is_file() {
        tracing::warn!(
            path = %config.attachment_file.display(),
            "Attachment file not found; sends will fail until it exists"
        );
    }

    // Recipient assignments are read once at startup
    let assignments = XlsxAssignmentRepository::load(&config.recipients_file)?;

    let identity = MicrosoftIdentity::new(&config);
    let mailer = GraphMailer::new(&config);

    // Create application state
    let state = AppState::new(
        config.clone(),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(assignments),
        Arc::new(identity),
        Arc::new(mailer),
    );

    // Build router
    let app = Router::new()
        .merge(api::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %addr, "Server listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Handle shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down...");
        },
    }
}
