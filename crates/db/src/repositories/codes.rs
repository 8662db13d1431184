//! Sequential code generation.
//!
//! Reads the greatest code already stored under the month's prefix and
//! returns the next one. The read runs inside the writing transaction; two
//! concurrent writers may still compute the same code, and the unique index
//! then rejects the second insert as a retryable `CodeConflict`.

use chrono::NaiveDate;
use gudang_core::document::{
    DOCUMENT_CODE_WIDTH, DocumentError, DocumentKind, PRODUCT_CODE_WIDTH, code_prefix, next_code,
};
use gudang_shared::types::{CompanyId, ProductId};
use sea_orm::sea_query::{Alias, ConditionalStatement, Expr, Order, Query};
use sea_orm::{ConnectionTrait, FromQueryResult};
use uuid::Uuid;

use crate::documents::family::tables_for;
use crate::error::document_error;

#[derive(Debug, FromQueryResult)]
struct CodeRow {
    code: String,
}

/// Code generator for document codes and product-scoped line codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeGenerator;

impl CodeGenerator {
    /// Next document code of `kind` for `company` in the month of `today`,
    /// e.g. `PO20261000001`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedCode` if the stored latest code cannot be parsed,
    /// `CodeSequenceExhausted` on overflow, or a database error.
    pub async fn next_document_code<C: ConnectionTrait>(
        conn: &C,
        kind: DocumentKind,
        company: CompanyId,
        today: NaiveDate,
    ) -> Result<String, DocumentError> {
        let prefix = code_prefix(kind, today);
        let latest = Self::latest(
            conn,
            tables_for(kind).header,
            "company_id",
            company.into_inner(),
            &prefix,
        )
        .await?;
        next_code(&prefix, DOCUMENT_CODE_WIDTH, latest.as_deref())
    }

    /// Next line code of `kind` for `product` in the month of `today`,
    /// sequenced over the family's detail table.
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_document_code`].
    pub async fn next_line_code<C: ConnectionTrait>(
        conn: &C,
        kind: DocumentKind,
        product: ProductId,
        today: NaiveDate,
    ) -> Result<String, DocumentError> {
        let prefix = code_prefix(kind, today);
        let latest = Self::latest(
            conn,
            tables_for(kind).detail,
            "product_id",
            product.into_inner(),
            &prefix,
        )
        .await?;
        next_code(&prefix, PRODUCT_CODE_WIDTH, latest.as_deref())
    }

    async fn latest<C: ConnectionTrait>(
        conn: &C,
        table: &str,
        scope_column: &str,
        scope: Uuid,
        prefix: &str,
    ) -> Result<Option<String>, DocumentError> {
        let stmt = Query::select()
            .column(Alias::new("code"))
            .from(Alias::new(table))
            .and_where(Expr::col(Alias::new(scope_column)).eq(scope))
            .and_where(Expr::col(Alias::new("code")).like(format!("{prefix}%")))
            .order_by(Alias::new("code"), Order::Desc)
            .limit(1)
            .to_owned();

        let row = CodeRow::find_by_statement(conn.get_database_backend().build(&stmt))
            .one(conn)
            .await
            .map_err(document_error)?;

        Ok(row.map(|row| row.code))
    }
}
