//! Inventory ledger repository.
//!
//! Every write is keyed by the composite [`LedgerKey`]; the row's own id is
//! never used to find it. Writes run on the caller's connection, which is
//! the transaction that also writes the owning detail.

use chrono::Utc;
use gudang_core::document::{Direction, DocumentError, DocumentKind};
use gudang_core::inventory::{LedgerKey, Posting, StockMovement, net_quantity};
use gudang_shared::types::{BranchId, CompanyId, DocumentId, InventoryEntryId, ProductId};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use tracing::debug;

use crate::entities::inventories;
use crate::error::document_error;

/// Inventory ledger.
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    db: DatabaseConnection,
}

impl InventoryLedger {
    /// Creates a new inventory ledger.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Writes the ledger row of a newly inserted detail.
    ///
    /// # Errors
    ///
    /// Returns `CodeConflict` if a row with the same key already exists, or a
    /// database error.
    pub async fn post<C: ConnectionTrait>(
        conn: &C,
        posting: &Posting,
    ) -> Result<inventories::Model, DocumentError> {
        let now = Utc::now();

        let entry = inventories::ActiveModel {
            id: Set(InventoryEntryId::new().into_inner()),
            company_id: Set(posting.company_id.into_inner()),
            branch_id: Set(posting.branch_id.into_inner()),
            shelve_id: Set(posting.shelve_id.into_inner()),
            product_id: Set(posting.key.product_id.into_inner()),
            product_code: Set(posting.key.product_code.clone()),
            transaction_id: Set(posting.key.transaction_id.into_inner()),
            code: Set(posting.transaction_code.clone()),
            transaction_date: Set(posting.transaction_date),
            transaction_type: Set(posting.key.kind.tag().to_string()),
            in_out: Set(posting.direction.as_flag()),
            qty: Set(posting.qty),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = entry.insert(conn).await.map_err(document_error)?;
        debug!(product_code = %posting.key.product_code, qty = posting.qty, "ledger entry posted");
        Ok(model)
    }

    /// Rewrites the ledger row found under `previous` with `posting`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerEntryNotFound` if no row matches `previous`.
    pub async fn repost<C: ConnectionTrait>(
        conn: &C,
        previous: &LedgerKey,
        posting: &Posting,
    ) -> Result<(), DocumentError> {
        let result = inventories::Entity::update_many()
            .col_expr(
                inventories::Column::ShelveId,
                Expr::value(posting.shelve_id.into_inner()),
            )
            .col_expr(
                inventories::Column::ProductId,
                Expr::value(posting.key.product_id.into_inner()),
            )
            .col_expr(
                inventories::Column::ProductCode,
                Expr::value(posting.key.product_code.clone()),
            )
            .col_expr(
                inventories::Column::Code,
                Expr::value(posting.transaction_code.clone()),
            )
            .col_expr(
                inventories::Column::TransactionDate,
                Expr::value(posting.transaction_date),
            )
            .col_expr(
                inventories::Column::InOut,
                Expr::value(posting.direction.as_flag()),
            )
            .col_expr(inventories::Column::Qty, Expr::value(posting.qty))
            .col_expr(inventories::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(key_condition(previous))
            .exec(conn)
            .await
            .map_err(document_error)?;

        if result.rows_affected == 0 {
            return Err(not_found(previous));
        }
        Ok(())
    }

    /// Deletes the ledger row of a removed detail.
    ///
    /// # Errors
    ///
    /// Returns `LedgerEntryNotFound` if no row matches `key`.
    pub async fn reverse<C: ConnectionTrait>(
        conn: &C,
        key: &LedgerKey,
    ) -> Result<(), DocumentError> {
        let result = inventories::Entity::delete_many()
            .filter(key_condition(key))
            .exec(conn)
            .await
            .map_err(document_error)?;

        if result.rows_affected == 0 {
            return Err(not_found(key));
        }
        Ok(())
    }

    /// Net quantity of `product` in `branch`: stock in minus stock out.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn stock_on_hand(
        &self,
        company: CompanyId,
        branch: BranchId,
        product: ProductId,
    ) -> Result<i64, DocumentError> {
        let rows: Vec<(bool, i64)> = inventories::Entity::find()
            .filter(inventories::Column::CompanyId.eq(company.into_inner()))
            .filter(inventories::Column::BranchId.eq(branch.into_inner()))
            .filter(inventories::Column::ProductId.eq(product.into_inner()))
            .select_only()
            .column(inventories::Column::InOut)
            .column(inventories::Column::Qty)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(document_error)?;

        Ok(net_quantity(rows.into_iter().map(|(in_out, qty)| StockMovement {
            direction: Direction::from_flag(in_out),
            qty,
        })))
    }

    /// Ledger rows owned by one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn entries_for_transaction(
        &self,
        kind: DocumentKind,
        transaction_id: DocumentId,
    ) -> Result<Vec<inventories::Model>, DocumentError> {
        Self::transaction_query(kind, transaction_id)
            .order_by_asc(inventories::Column::ProductCode)
            .all(&self.db)
            .await
            .map_err(document_error)
    }

    fn transaction_query(
        kind: DocumentKind,
        transaction_id: DocumentId,
    ) -> Select<inventories::Entity> {
        inventories::Entity::find()
            .filter(inventories::Column::TransactionId.eq(transaction_id.into_inner()))
            .filter(inventories::Column::TransactionType.eq(kind.tag()))
    }
}

fn key_condition(key: &LedgerKey) -> sea_orm::Condition {
    sea_orm::Condition::all()
        .add(inventories::Column::ProductId.eq(key.product_id.into_inner()))
        .add(inventories::Column::ProductCode.eq(key.product_code.as_str()))
        .add(inventories::Column::TransactionId.eq(key.transaction_id.into_inner()))
        .add(inventories::Column::TransactionType.eq(key.kind.tag()))
}

fn not_found(key: &LedgerKey) -> DocumentError {
    DocumentError::LedgerEntryNotFound {
        product_id: key.product_id,
        product_code: key.product_code.clone(),
        transaction_id: key.transaction_id,
        kind: key.kind,
    }
}
