use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cadence_backend::config::Config;
use cadence_backend::store::{CalendarStore, MemoryStore, PgStore};
use cadence_backend::{app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_backend=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn CalendarStore> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await
                .context("Failed to connect to Postgres")?;
            tracing::info!("🗄️ Connected to Postgres");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("⚠️ DATABASE_URL not set, keeping data in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let app = app(AppState::new(store));

    tracing::info!("🧠 Server running at {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
