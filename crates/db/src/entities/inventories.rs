//! `SeaORM` Entity for inventories table (the stock ledger).
//!
//! One row per stock-moving document detail, addressed by
//! `(product_id, product_code, transaction_id, type)`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "inventories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub shelve_id: Uuid,
    pub product_id: Uuid,
    pub product_code: String,
    pub transaction_id: Uuid,
    /// Code of the owning document.
    pub code: String,
    pub transaction_date: Date,
    /// Two-character family tag of the owning document.
    #[sea_orm(column_name = "type")]
    pub transaction_type: String,
    /// `true` for stock in.
    pub in_out: bool,
    pub qty: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shelves::Entity",
        from = "Column::ShelveId",
        to = "super::shelves::Column::Id"
    )]
    Shelves,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Products,
}

impl Related<super::shelves::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shelves.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
