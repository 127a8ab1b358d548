mod card;
mod config;
mod frame;
mod intent;
mod routes;
mod services;
mod state;

use config::{ConfigError, ServerConfig};

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env loaded");
    }

    if let Err(e) = run().await {
        tracing::error!(error = %e, "planning-poker failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr();
    let static_dir = config.static_dir.display().to_string();

    let state = state::AppState::new(config);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, %static_dir, "planning-poker listening");
    axum::serve(listener, app).await?;
    Ok(())
}
