//! Storefront service entry point.

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::api::{self, AppState};
use storefront::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let app = api::router(AppState::postgres(db));
    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!("storefront listening on {}", config.addr());
    axum::serve(listener, app).await?;
    Ok(())
}
