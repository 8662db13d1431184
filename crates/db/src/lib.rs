//! Database layer with `SeaORM` entities, repositories and the document engine.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the fixed tables
//! - Database migrations, including the sixteen family tables
//! - Repositories for scope, catalog, codes and the inventory ledger
//! - The per-family [`DocumentEngine`]

pub mod documents;
pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;

pub use documents::{DocumentEngine, EngineSettings};
pub use repositories::{CatalogRepository, CodeGenerator, InventoryLedger, ScopeRepository};

use std::time::Duration;

use gudang_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool sized by `config`.
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
