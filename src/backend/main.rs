//! SquadHub Server Entry Point
//!
//! Starts the realtime team-chat server: loads environment configuration,
//! initializes tracing, builds the app, and serves it.

use squadhub::backend::server::config::server_port;
use squadhub::backend::server::init::create_app;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let app = create_app().await?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], server_port()));
    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.router).await?;

    Ok(())
}
