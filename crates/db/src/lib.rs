//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - The [`DrawerStore`] boundary used by the API
//! - `SeaORM` entity definitions and the PostgreSQL [`DrawerRepository`]
//! - An [`InMemoryDrawerStore`] for tests and local runs
//! - Database migrations

pub mod entities;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use memory::InMemoryDrawerStore;
pub use repositories::DrawerRepository;
pub use store::DrawerStore;

use std::time::Duration;

use caja_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}
