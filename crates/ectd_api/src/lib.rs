pub mod error;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use ectd_db::PgSubmissionStore;
use ectd_service::config::Config;
use ectd_service::EctdService;

#[derive(Clone)]
pub struct AppState {
    pub service: EctdService,
    /// Recorded as the actor when a request carries no `X-User-Id`.
    pub default_actor: String,
}

impl AppState {
    pub fn new(service: EctdService, default_actor: impl Into<String>) -> Self {
        Self {
            service,
            default_actor: default_actor.into(),
        }
    }
}

/// Connects to Postgres, applies the schema and serves until the process stops.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(config.require_database_url()?)
        .await
        .context("Failed to connect to database")?;

    ectd_db::schema::rebuild_database(&pool)
        .await
        .context("Failed to apply database schema")?;

    let service = EctdService::new(Arc::new(PgSubmissionStore::new(pool)), config.build.clone());
    let app = routes::app_router(AppState::new(service, config.default_actor.clone()));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
