//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration.

pub use sea_orm_migration::prelude::*;

mod m20261001_000001_organization;
mod m20261001_000002_documents;
mod m20261001_000003_inventories;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_organization::Migration),
            Box::new(m20261001_000002_documents::Migration),
            Box::new(m20261001_000003_inventories::Migration),
        ]
    }
}
