//! Inventory ledger.

use sea_orm_migration::prelude::*;

use super::m20261001_000001_organization::{Branches, Companies, Products, Shelves};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inventories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Inventories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Inventories::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Inventories::BranchId).uuid().not_null())
                    .col(ColumnDef::new(Inventories::ShelveId).uuid().not_null())
                    .col(ColumnDef::new(Inventories::ProductId).uuid().not_null())
                    .col(ColumnDef::new(Inventories::ProductCode).string().not_null())
                    .col(ColumnDef::new(Inventories::TransactionId).uuid().not_null())
                    .col(ColumnDef::new(Inventories::Code).string().not_null())
                    .col(ColumnDef::new(Inventories::TransactionDate).date().not_null())
                    .col(ColumnDef::new(Inventories::Type).string_len(2).not_null())
                    .col(ColumnDef::new(Inventories::InOut).boolean().not_null())
                    .col(ColumnDef::new(Inventories::Qty).big_integer().not_null())
                    .col(
                        ColumnDef::new(Inventories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Inventories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventories_company")
                            .from(Inventories::Table, Inventories::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventories_branch")
                            .from(Inventories::Table, Inventories::BranchId)
                            .to(Branches::Table, Branches::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventories_shelve")
                            .from(Inventories::Table, Inventories::ShelveId)
                            .to(Shelves::Table, Shelves::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventories_product")
                            .from(Inventories::Table, Inventories::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite key every repost/reverse looks rows up by
        manager
            .create_index(
                Index::create()
                    .name("uq_inventories_ledger_key")
                    .table(Inventories::Table)
                    .col(Inventories::ProductId)
                    .col(Inventories::ProductCode)
                    .col(Inventories::TransactionId)
                    .col(Inventories::Type)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventories_stock")
                    .table(Inventories::Table)
                    .col(Inventories::CompanyId)
                    .col(Inventories::BranchId)
                    .col(Inventories::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Inventories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Inventories {
    Table,
    Id,
    CompanyId,
    BranchId,
    ShelveId,
    ProductId,
    ProductCode,
    TransactionId,
    Code,
    TransactionDate,
    Type,
    InOut,
    Qty,
    CreatedAt,
    UpdatedAt,
}
