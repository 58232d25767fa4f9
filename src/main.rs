//! Main entry point for the OPX surgical order backend.
//!
//! Resolves configuration from the environment, runs pending database
//! migrations, and serves the REST API (with Swagger UI) on the configured
//! address.
//!
//! # Environment Variables
//! - `DATABASE_URL`: Postgres connection string (required)
//! - `OPX_UPLOAD_DIR`: upload storage root (default: "./uploads")
//! - `OPX_SESSION_TTL_MINUTES`: login session lifetime (default: 12 hours)
//! - `OPX_ADDR`: server address (default: "0.0.0.0:3000")

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("opx=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = api_rest::state_from_env().await?;
    let addr = state.cfg.bind_addr().to_owned();

    tracing::info!("++ Starting OPX on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api_rest::router(state)).await?;

    Ok(())
}
