//! Cash drawer ledger API server.
//!
//! Main entry point for the `/caja` service.

use caja_api::{AppState, create_router};
use caja_db::{DrawerRepository, InMemoryDrawerStore, connect, migration::Migrator};
use caja_shared::AppConfig;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Database URL that selects the volatile in-process store.
const MEMORY_URL: &str = "memory://";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caja=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    let state = if config.database.url == MEMORY_URL {
        warn!("Using in-memory drawer store; data is lost on shutdown");
        AppState::new(InMemoryDrawerStore::new())
    } else {
        let db = connect(&config.database).await?;
        info!(
            max_connections = config.database.max_connections,
            "Connected to database"
        );

        if config.database.run_migrations {
            Migrator::up(&db, None).await?;
            info!("Migrations applied");
        }

        AppState::new(DrawerRepository::new(db))
    };

    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
