use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::prelude::*;

use like_service::config::{Config, StoreBackend};
use like_service::handlers;
use like_service::middleware::JwtAuthMiddleware;
use like_service::repository::{
    ContentRepository, ContentStore, InMemoryStore, LikeRepository, LikeStore,
};
use like_service::services::LikeEventBus;
use like_service::AppState;

async fn connect_postgres(config: &Config) -> Result<sqlx::PgPool> {
    // Prepared statement caching disabled for PgBouncer transaction mode
    let connect_options = PgConnectOptions::from_str(&config.database.url)
        .context("Failed to parse DATABASE_URL")?
        .statement_cache_capacity(0);

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect_with(connect_options)
        .await
        .context("Failed to connect to database")?;

    sqlx::query("SELECT 1")
        .execute(&pg_pool)
        .await
        .context("Failed to verify database connection")?;
    info!("✅ Database pool created and verified");

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("✅ Database migrations completed");

    Ok(pg_pool)
}

#[actix_web::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,like_service=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true),
        )
        .init();

    info!("🔧 Starting like-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "✅ Configuration loaded: env={}, http_port={}, store={:?}",
        config.app.env, config.app.http_port, config.app.store_backend
    );

    let like_store: Arc<dyn LikeStore>;
    let content_store: Arc<dyn ContentStore>;
    match config.app.store_backend {
        StoreBackend::Postgres => {
            let pool = connect_postgres(&config).await?;
            like_store = Arc::new(LikeRepository::new(pool.clone()));
            content_store = Arc::new(ContentRepository::new(pool));
        }
        StoreBackend::Memory => {
            tracing::warn!("⚠️  Running with in-memory store; data is lost on exit");
            let store = Arc::new(InMemoryStore::new());
            let seed = store
                .seed_demo()
                .await
                .context("Failed to seed in-memory store")?;
            info!(
                author_id = %seed.author_id,
                reader_id = %seed.reader_id,
                post_id = %seed.post_id,
                comment_id = %seed.comment_id,
                "✅ In-memory store seeded with demo data"
            );
            like_store = store.clone();
            content_store = store;
        }
    }

    let events = LikeEventBus::new(config.events.channel_capacity);
    let app_state = web::Data::new(AppState::new(like_store, content_store, events));
    info!("✅ AppState created");

    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);
    let jwt_secret = config.auth.jwt_secret.clone();

    info!("🚀 Starting HTTP server on http://{}", http_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(JwtAuthMiddleware::new(&jwt_secret))
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&http_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    info!("🛑 like-service shutting down");
    Ok(())
}
