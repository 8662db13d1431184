//! Header and detail tables of the eight document families.
//!
//! The tables share one shape and are generated from the family
//! descriptors, parents first so that parent foreign keys resolve.

use gudang_core::document::DocumentKind;
use sea_orm_migration::prelude::*;

use super::m20261001_000001_organization::{Branches, Companies, Products, Shelves};
use crate::documents::family::{parent_column, tables_for};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for kind in DocumentKind::ALL {
            manager.create_table(header_table(kind)).await?;
            manager.create_table(detail_table(kind)).await?;

            let tables = tables_for(kind);
            manager
                .create_index(
                    Index::create()
                        .name(format!("uq_{}_company_code", tables.header))
                        .table(Alias::new(tables.header))
                        .col(Alias::new("company_id"))
                        .col(Alias::new("code"))
                        .unique()
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{}_branch_date", tables.header))
                        .table(Alias::new(tables.header))
                        .col(Alias::new("company_id"))
                        .col(Alias::new("branch_id"))
                        .col(Alias::new("date"))
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{}_document", tables.detail))
                        .table(Alias::new(tables.detail))
                        .col(Alias::new(tables.fk))
                        .to_owned(),
                )
                .await?;

            if kind.mints_line_codes() {
                manager
                    .create_index(
                        Index::create()
                            .name(format!("uq_{}_product_code", tables.detail))
                            .table(Alias::new(tables.detail))
                            .col(Alias::new("product_id"))
                            .col(Alias::new("code"))
                            .unique()
                            .to_owned(),
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for kind in DocumentKind::ALL.into_iter().rev() {
            let tables = tables_for(kind);
            manager
                .drop_table(Table::drop().table(Alias::new(tables.detail)).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Alias::new(tables.header)).to_owned())
                .await?;
        }
        Ok(())
    }
}

fn header_table(kind: DocumentKind) -> TableCreateStatement {
    let tables = tables_for(kind);
    let header = Alias::new(tables.header);

    let mut table = Table::create();
    table
        .table(header.clone())
        .if_not_exists()
        .col(ColumnDef::new(Alias::new("id")).uuid().not_null().primary_key())
        .col(ColumnDef::new(Alias::new("code")).string().not_null())
        .col(ColumnDef::new(Alias::new("date")).date().not_null())
        .col(ColumnDef::new(Alias::new("remark")).text().null())
        .col(ColumnDef::new(Alias::new("disc")).decimal_len(16, 4).null());

    if let Some(partner) = tables.partner {
        table.col(ColumnDef::new(Alias::new(partner)).uuid().null());
    }

    if let (Some(parent), Some(column)) = (kind.parent(), parent_column(kind)) {
        table
            .col(ColumnDef::new(Alias::new(column)).uuid().not_null())
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_{column}", tables.header))
                    .from(header.clone(), Alias::new(column))
                    .to(Alias::new(tables_for(parent).header), Alias::new("id"))
                    .on_delete(ForeignKeyAction::Restrict),
            );
    }

    table
        .col(ColumnDef::new(Alias::new("company_id")).uuid().not_null())
        .col(ColumnDef::new(Alias::new("branch_id")).uuid().not_null())
        .col(ColumnDef::new(Alias::new("created_by")).uuid().not_null())
        .col(ColumnDef::new(Alias::new("updated_by")).uuid().not_null())
        .col(
            ColumnDef::new(Alias::new("created_at"))
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(Alias::new("updated_at"))
                .timestamp_with_time_zone()
                .not_null(),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{}_company", tables.header))
                .from(header.clone(), Alias::new("company_id"))
                .to(Companies::Table, Companies::Id)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{}_branch", tables.header))
                .from(header, Alias::new("branch_id"))
                .to(Branches::Table, Branches::Id)
                .on_delete(ForeignKeyAction::Restrict),
        );

    table
}

fn detail_table(kind: DocumentKind) -> TableCreateStatement {
    let tables = tables_for(kind);
    let detail = Alias::new(tables.detail);

    let mut table = Table::create();
    table
        .table(detail.clone())
        .if_not_exists()
        .col(ColumnDef::new(Alias::new("id")).uuid().not_null().primary_key())
        .col(ColumnDef::new(Alias::new(tables.fk)).uuid().not_null())
        .col(ColumnDef::new(Alias::new("product_id")).uuid().not_null())
        .col(ColumnDef::new(Alias::new("qty")).big_integer().not_null())
        .col(ColumnDef::new(Alias::new("code")).string().not_null())
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{}_{}", tables.detail, tables.fk))
                .from(detail.clone(), Alias::new(tables.fk))
                .to(Alias::new(tables.header), Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{}_product", tables.detail))
                .from(detail.clone(), Alias::new("product_id"))
                .to(Products::Table, Products::Id)
                .on_delete(ForeignKeyAction::Restrict),
        );

    if kind.is_priced() {
        table
            .col(ColumnDef::new(Alias::new("price")).decimal_len(16, 4).not_null())
            .col(ColumnDef::new(Alias::new("disc")).decimal_len(16, 4).not_null());
    }

    if kind.moves_stock() {
        table
            .col(ColumnDef::new(Alias::new("shelve_id")).uuid().not_null())
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_shelve", tables.detail))
                    .from(detail, Alias::new("shelve_id"))
                    .to(Shelves::Table, Shelves::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            );
    }

    table
}
