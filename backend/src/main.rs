use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{info, warn};

use pricetrack_backend::app::create_app;
use pricetrack_backend::config::Config;
use pricetrack_backend::logging::{init_logging, LoggingConfig};
use pricetrack_backend::services::summary_cache::spawn_invalidator;
use pricetrack_backend::state::AppState;
use pricetrack_backend::store::{MemoryPriceStore, PgPriceStore, PriceStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = Config::from_env().context("invalid configuration")?;
    info!("Loaded configuration: {:?}", config);

    let store: Arc<dyn PriceStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await
                .context("failed to connect to the database")?;

            if config.run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("failed to run database migrations")?;
                info!("✓ Database migrations applied");
            }

            info!("🗄️ Using Postgres price store");
            Arc::new(PgPriceStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set, using the in-memory price store (data is lost on exit)");
            Arc::new(MemoryPriceStore::new())
        }
    };

    let bind_addr = config.bind_addr;
    let state = AppState::new(store, config);
    let invalidator = spawn_invalidator(state.summary_cache.clone(), state.store.subscribe());
    let app = create_app(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("🚀 Price tracker backend running at http://{}/", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    invalidator.abort();
    info!("👋 Price tracker backend stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
