//! The backend for the Sahyog Foundation's website

use std::net::SocketAddr;

use sahyog::config::Settings;
use sahyog::routes;
use sahyog::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sahyog=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let port = settings.port;
    let state = AppState::initialize(settings).await?;

    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "serving the foundation API");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
