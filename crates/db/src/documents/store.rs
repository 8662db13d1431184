//! Storage access for one family's header and detail tables.
//!
//! Family tables have no `SeaORM` entity; statements are built with
//! sea-query against the names in [`FamilyTables`]. Every method takes the
//! connection to run on, so the engine can pass its open transaction.

use std::collections::HashMap;

use gudang_core::document::{
    DocumentDetail, DocumentError, DocumentFilter, DocumentHeader, DocumentKind,
};
use gudang_core::scope::Visibility;
use gudang_shared::types::{CompanyId, DetailId, DocumentId, ProductId};
use sea_orm::sea_query::{
    Alias, ConditionalStatement, Expr, InsertStatement, JoinType, Order, Query, SelectStatement,
    SimpleExpr,
};
use sea_orm::{ConnectionTrait, FromQueryResult, StatementBuilder};

use super::family::{FamilyTables, parent_column, tables_for};
use super::rows::{AggregateRow, CountRow, DetailRow, HeaderRow, LineCodeRow, ProductQtyRow};
use crate::error::document_error;

const H: &str = "h";
const D: &str = "d";

fn col(table: &str, column: &str) -> (Alias, Alias) {
    (Alias::new(table), Alias::new(column))
}

fn null() -> SimpleExpr {
    Expr::cust("NULL")
}

/// Header and detail access for one family.
#[derive(Debug, Clone, Copy)]
pub struct DocumentStore {
    kind: DocumentKind,
    tables: FamilyTables,
}

impl DocumentStore {
    /// Store of `kind`.
    #[must_use]
    pub const fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            tables: tables_for(kind),
        }
    }

    // ========================================================================
    // Headers
    // ========================================================================

    /// Finds a header of `company`, whatever its branch.
    pub async fn find<C: ConnectionTrait>(
        &self,
        conn: &C,
        company: CompanyId,
        id: DocumentId,
    ) -> Result<Option<HeaderRow>, DocumentError> {
        let mut stmt = self.header_select();
        stmt.and_where(Expr::col(col(H, "company_id")).eq(company.into_inner()))
            .and_where(Expr::col(col(H, "id")).eq(id.into_inner()));

        HeaderRow::find_by_statement(conn.get_database_backend().build(&stmt))
            .one(conn)
            .await
            .map_err(document_error)
    }

    /// Counts headers matching `filter` inside `visibility`.
    pub async fn count<C: ConnectionTrait>(
        &self,
        conn: &C,
        company: CompanyId,
        visibility: &Visibility,
        filter: &DocumentFilter,
    ) -> Result<u64, DocumentError> {
        let mut stmt = Query::select();
        stmt.from_as(Alias::new(self.tables.header), Alias::new(H))
            .expr_as(Expr::cust("COUNT(*)"), Alias::new("total"));
        self.apply_filter(&mut stmt, company, visibility, filter);

        let row = CountRow::find_by_statement(conn.get_database_backend().build(&stmt))
            .one(conn)
            .await
            .map_err(document_error)?;

        Ok(row.map_or(0, |row| u64::try_from(row.total).unwrap_or(0)))
    }

    /// One page of headers matching `filter`, newest first.
    pub async fn page<C: ConnectionTrait>(
        &self,
        conn: &C,
        company: CompanyId,
        visibility: &Visibility,
        filter: &DocumentFilter,
    ) -> Result<Vec<HeaderRow>, DocumentError> {
        let mut stmt = self.header_select();
        self.apply_filter(&mut stmt, company, visibility, filter);
        stmt.order_by(col(H, "date"), Order::Desc)
            .order_by(col(H, "code"), Order::Desc)
            .limit(filter.page.limit())
            .offset(filter.page.offset());

        HeaderRow::find_by_statement(conn.get_database_backend().build(&stmt))
            .all(conn)
            .await
            .map_err(document_error)
    }

    /// Inserts a new header.
    ///
    /// A duplicate `(company_id, code)` surfaces as `CodeConflict`.
    pub async fn insert_header<C: ConnectionTrait>(
        &self,
        conn: &C,
        header: &DocumentHeader,
    ) -> Result<(), DocumentError> {
        let mut row: Vec<(&str, SimpleExpr)> = vec![
            ("id", Expr::value(header.id.into_inner())),
            ("code", Expr::value(header.code.clone())),
            ("date", Expr::value(header.date)),
            ("remark", Expr::value(header.remark.clone())),
            ("disc", Expr::value(header.disc)),
        ];
        if let Some(partner) = self.tables.partner {
            row.push((partner, Expr::value(header.partner_id)));
        }
        if let Some(parent) = parent_column(self.kind) {
            row.push((parent, Expr::value(header.parent_id.map(DocumentId::into_inner))));
        }
        row.extend([
            ("company_id", Expr::value(header.company_id.into_inner())),
            ("branch_id", Expr::value(header.branch_id.into_inner())),
            ("created_by", Expr::value(header.created_by.into_inner())),
            ("updated_by", Expr::value(header.updated_by.into_inner())),
            ("created_at", Expr::value(header.created_at)),
            ("updated_at", Expr::value(header.updated_at)),
        ]);

        execute(conn, &insert(self.tables.header, row)?).await?;
        Ok(())
    }

    /// Overwrites the mutable header fields.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` if no row of the company matched.
    pub async fn update_header<C: ConnectionTrait>(
        &self,
        conn: &C,
        header: &DocumentHeader,
    ) -> Result<(), DocumentError> {
        let mut stmt = Query::update();
        stmt.table(Alias::new(self.tables.header))
            .value(Alias::new("date"), Expr::value(header.date))
            .value(Alias::new("remark"), Expr::value(header.remark.clone()))
            .value(Alias::new("disc"), Expr::value(header.disc))
            .value(Alias::new("updated_by"), Expr::value(header.updated_by.into_inner()))
            .value(Alias::new("updated_at"), Expr::value(header.updated_at));
        if let Some(partner) = self.tables.partner {
            stmt.value(Alias::new(partner), Expr::value(header.partner_id));
        }
        if let Some(parent) = parent_column(self.kind) {
            stmt.value(
                Alias::new(parent),
                Expr::value(header.parent_id.map(DocumentId::into_inner)),
            );
        }
        stmt.and_where(Expr::col(Alias::new("id")).eq(header.id.into_inner()))
            .and_where(Expr::col(Alias::new("company_id")).eq(header.company_id.into_inner()));

        if execute(conn, &stmt).await? == 0 {
            return Err(DocumentError::DocumentNotFound {
                kind: self.kind,
                id: header.id,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Details
    // ========================================================================

    /// Detail lines of a document, ordered by id.
    pub async fn details<C: ConnectionTrait>(
        &self,
        conn: &C,
        document: DocumentId,
    ) -> Result<Vec<DocumentDetail>, DocumentError> {
        let mut stmt = Query::select();
        stmt.from_as(Alias::new(self.tables.detail), Alias::new(D))
            .column(col(D, "id"))
            .expr_as(Expr::col(col(D, self.tables.fk)), Alias::new("document_id"))
            .columns([col(D, "product_id"), col(D, "qty")]);
        if self.kind.is_priced() {
            stmt.columns([col(D, "price"), col(D, "disc")]);
        } else {
            stmt.expr_as(null(), Alias::new("price"))
                .expr_as(null(), Alias::new("disc"));
        }
        if self.kind.moves_stock() {
            stmt.column(col(D, "shelve_id"));
        } else {
            stmt.expr_as(null(), Alias::new("shelve_id"));
        }
        stmt.column(col(D, "code"))
            .and_where(Expr::col(col(D, self.tables.fk)).eq(document.into_inner()))
            .order_by(col(D, "id"), Order::Asc);

        let rows = DetailRow::find_by_statement(conn.get_database_backend().build(&stmt))
            .all(conn)
            .await
            .map_err(document_error)?;

        Ok(rows.into_iter().map(DocumentDetail::from).collect())
    }

    /// Inserts a detail line.
    ///
    /// A duplicate `(product_id, code)` surfaces as `CodeConflict`.
    pub async fn insert_detail<C: ConnectionTrait>(
        &self,
        conn: &C,
        detail: &DocumentDetail,
    ) -> Result<(), DocumentError> {
        let mut row: Vec<(&str, SimpleExpr)> = vec![
            ("id", Expr::value(detail.id.into_inner())),
            (self.tables.fk, Expr::value(detail.document_id.into_inner())),
        ];
        row.extend(self.detail_values(detail));

        execute(conn, &insert(self.tables.detail, row)?).await?;
        Ok(())
    }

    /// Overwrites a detail line of its document.
    ///
    /// # Errors
    ///
    /// Returns `DetailNotFound` if the line is not on that document.
    pub async fn update_detail<C: ConnectionTrait>(
        &self,
        conn: &C,
        detail: &DocumentDetail,
    ) -> Result<(), DocumentError> {
        let mut stmt = Query::update();
        stmt.table(Alias::new(self.tables.detail));
        for (column, value) in self.detail_values(detail) {
            stmt.value(Alias::new(column), value);
        }
        stmt.and_where(Expr::col(Alias::new("id")).eq(detail.id.into_inner()))
            .and_where(Expr::col(Alias::new(self.tables.fk)).eq(detail.document_id.into_inner()));

        if execute(conn, &stmt).await? == 0 {
            return Err(DocumentError::DetailNotFound(detail.id));
        }
        Ok(())
    }

    /// Deletes a detail line of `document`.
    ///
    /// # Errors
    ///
    /// Returns `DetailNotFound` if the line is not on that document.
    pub async fn delete_detail<C: ConnectionTrait>(
        &self,
        conn: &C,
        document: DocumentId,
        id: DetailId,
    ) -> Result<(), DocumentError> {
        let stmt = Query::delete()
            .from_table(Alias::new(self.tables.detail))
            .and_where(Expr::col(Alias::new("id")).eq(id.into_inner()))
            .and_where(Expr::col(Alias::new(self.tables.fk)).eq(document.into_inner()))
            .to_owned();

        if execute(conn, &stmt).await? == 0 {
            return Err(DocumentError::DetailNotFound(id));
        }
        Ok(())
    }

    /// Detail aggregates of the given documents, keyed by document id.
    pub async fn aggregates<C: ConnectionTrait>(
        &self,
        conn: &C,
        documents: &[DocumentId],
    ) -> Result<HashMap<DocumentId, AggregateRow>, DocumentError> {
        if documents.is_empty() {
            return Ok(HashMap::new());
        }

        let mut stmt = Query::select();
        stmt.from_as(Alias::new(self.tables.detail), Alias::new(D))
            .expr_as(Expr::col(col(D, self.tables.fk)), Alias::new("document_id"))
            .expr_as(Expr::cust("COUNT(*)"), Alias::new("line_count"))
            .expr_as(Expr::cust("CAST(SUM(d.qty) AS BIGINT)"), Alias::new("total_qty"));
        if self.kind.is_priced() {
            stmt.expr_as(Expr::cust("SUM(d.price * d.qty)"), Alias::new("total_price"))
                .expr_as(Expr::cust("SUM(d.disc)"), Alias::new("total_disc"));
        } else {
            stmt.expr_as(null(), Alias::new("total_price"))
                .expr_as(null(), Alias::new("total_disc"));
        }
        stmt.and_where(
            Expr::col(col(D, self.tables.fk))
                .is_in(documents.iter().map(|id| id.into_inner())),
        )
        .group_by_col(col(D, self.tables.fk));

        let rows = AggregateRow::find_by_statement(conn.get_database_backend().build(&stmt))
            .all(conn)
            .await
            .map_err(document_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (DocumentId::from_uuid(row.document_id), row))
            .collect())
    }

    /// Quantity per product on one document.
    pub async fn quantities_by_product<C: ConnectionTrait>(
        &self,
        conn: &C,
        document: DocumentId,
    ) -> Result<Vec<(ProductId, i64)>, DocumentError> {
        let stmt = Query::select()
            .from_as(Alias::new(self.tables.detail), Alias::new(D))
            .column(col(D, "product_id"))
            .expr_as(Expr::cust("CAST(SUM(d.qty) AS BIGINT)"), Alias::new("qty"))
            .and_where(Expr::col(col(D, self.tables.fk)).eq(document.into_inner()))
            .group_by_col(col(D, "product_id"))
            .to_owned();

        product_quantities(conn, &stmt).await
    }

    /// Quantity per product already returned against `parent` by documents
    /// of this (return) family, leaving out `excluding`.
    pub async fn returned_against<C: ConnectionTrait>(
        &self,
        conn: &C,
        parent: DocumentId,
        excluding: Option<DocumentId>,
    ) -> Result<Vec<(ProductId, i64)>, DocumentError> {
        let Some(parent_col) = parent_column(self.kind) else {
            return Ok(Vec::new());
        };

        let mut stmt = Query::select();
        stmt.from_as(Alias::new(self.tables.detail), Alias::new(D))
            .join_as(
                JoinType::InnerJoin,
                Alias::new(self.tables.header),
                Alias::new(H),
                Expr::col(col(H, "id")).equals(col(D, self.tables.fk)),
            )
            .column(col(D, "product_id"))
            .expr_as(Expr::cust("CAST(SUM(d.qty) AS BIGINT)"), Alias::new("qty"))
            .and_where(Expr::col(col(H, parent_col)).eq(parent.into_inner()));
        if let Some(own) = excluding {
            stmt.and_where(Expr::col(col(H, "id")).ne(own.into_inner()));
        }
        stmt.group_by_col(col(D, "product_id"));

        product_quantities(conn, &stmt).await
    }

    /// `(product, line code)` pairs of one document.
    pub async fn line_codes<C: ConnectionTrait>(
        &self,
        conn: &C,
        document: DocumentId,
    ) -> Result<Vec<(ProductId, String)>, DocumentError> {
        let stmt = Query::select()
            .columns([Alias::new("product_id"), Alias::new("code")])
            .from(Alias::new(self.tables.detail))
            .and_where(Expr::col(Alias::new(self.tables.fk)).eq(document.into_inner()))
            .to_owned();

        let rows = LineCodeRow::find_by_statement(conn.get_database_backend().build(&stmt))
            .all(conn)
            .await
            .map_err(document_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (ProductId::from_uuid(row.product_id), row.code))
            .collect())
    }

    // ========================================================================
    // Statement helpers
    // ========================================================================

    /// Header projection with the parent (`p`) and origin (`g`) joined.
    fn header_select(&self) -> SelectStatement {
        let mut stmt = Query::select();
        stmt.from_as(Alias::new(self.tables.header), Alias::new(H))
            .columns(
                [
                    "id",
                    "code",
                    "date",
                    "remark",
                    "disc",
                    "company_id",
                    "branch_id",
                    "created_by",
                    "updated_by",
                    "created_at",
                    "updated_at",
                ]
                .map(|column| col(H, column)),
            );

        match self.tables.partner {
            Some(partner) => stmt.expr_as(Expr::col(col(H, partner)), Alias::new("partner_id")),
            None => stmt.expr_as(null(), Alias::new("partner_id")),
        };

        let (Some(parent), Some(parent_col)) = (self.kind.parent(), parent_column(self.kind))
        else {
            stmt.expr_as(null(), Alias::new("parent_id"))
                .expr_as(null(), Alias::new("parent_code"))
                .expr_as(null(), Alias::new("parent_date"))
                .expr_as(null(), Alias::new("origin_code"));
            return stmt;
        };

        stmt.expr_as(Expr::col(col(H, parent_col)), Alias::new("parent_id"))
            .join_as(
                JoinType::LeftJoin,
                Alias::new(tables_for(parent).header),
                Alias::new("p"),
                Expr::col(col("p", "id")).equals(col(H, parent_col)),
            )
            .expr_as(Expr::col(col("p", "code")), Alias::new("parent_code"))
            .expr_as(Expr::col(col("p", "date")), Alias::new("parent_date"));

        match (parent.parent(), parent_column(parent)) {
            (Some(origin), Some(origin_col)) => {
                stmt.join_as(
                    JoinType::LeftJoin,
                    Alias::new(tables_for(origin).header),
                    Alias::new("g"),
                    Expr::col(col("g", "id")).equals(col("p", origin_col)),
                )
                .expr_as(Expr::col(col("g", "code")), Alias::new("origin_code"));
            }
            _ => {
                stmt.expr_as(null(), Alias::new("origin_code"));
            }
        }

        stmt
    }

    /// ANDs the company, visibility and list filters onto a header query.
    fn apply_filter(
        &self,
        stmt: &mut SelectStatement,
        company: CompanyId,
        visibility: &Visibility,
        filter: &DocumentFilter,
    ) {
        stmt.and_where(Expr::col(col(H, "company_id")).eq(company.into_inner()));

        if let Some(branches) = visibility.branch_ids() {
            stmt.and_where(
                Expr::col(col(H, "branch_id")).is_in(branches.iter().map(|id| id.into_inner())),
            );
        }
        if let Some(branch) = filter.branch_id {
            stmt.and_where(Expr::col(col(H, "branch_id")).eq(branch.into_inner()));
        }
        if let Some(from) = filter.date_from {
            stmt.and_where(Expr::col(col(H, "date")).gte(from));
        }
        if let Some(to) = filter.date_to {
            stmt.and_where(Expr::col(col(H, "date")).lte(to));
        }
        if let Some(code) = filter.code.as_deref().filter(|code| !code.is_empty()) {
            stmt.and_where(Expr::col(col(H, "code")).like(format!("%{code}%")));
        }
        if let Some(parent) = filter.parent_id {
            match parent_column(self.kind) {
                Some(parent_col) => {
                    stmt.and_where(Expr::col(col(H, parent_col)).eq(parent.into_inner()));
                }
                None => {
                    stmt.and_where(Expr::cust("1 = 0"));
                }
            }
        }
    }

    /// Column values written on both insert and update of a detail.
    fn detail_values(&self, detail: &DocumentDetail) -> Vec<(&'static str, SimpleExpr)> {
        let mut values = vec![
            ("product_id", Expr::value(detail.product_id.into_inner())),
            ("qty", Expr::value(detail.qty)),
            ("code", Expr::value(detail.code.clone())),
        ];
        if self.kind.is_priced() {
            values.push(("price", Expr::value(detail.price)));
            values.push(("disc", Expr::value(detail.disc)));
        }
        if self.kind.moves_stock() {
            values.push((
                "shelve_id",
                Expr::value(detail.shelve_id.map(|id| id.into_inner())),
            ));
        }
        values
    }
}

fn insert(table: &str, row: Vec<(&str, SimpleExpr)>) -> Result<InsertStatement, DocumentError> {
    let (columns, values): (Vec<Alias>, Vec<SimpleExpr>) = row
        .into_iter()
        .map(|(column, value)| (Alias::new(column), value))
        .unzip();

    let mut stmt = Query::insert();
    stmt.into_table(Alias::new(table))
        .columns(columns)
        .values(values)
        .map_err(|err| DocumentError::Database(err.to_string()))?;
    Ok(stmt)
}

async fn execute<C: ConnectionTrait, S: StatementBuilder>(
    conn: &C,
    stmt: &S,
) -> Result<u64, DocumentError> {
    let result = conn
        .execute(conn.get_database_backend().build(stmt))
        .await
        .map_err(document_error)?;
    Ok(result.rows_affected())
}

async fn product_quantities<C: ConnectionTrait>(
    conn: &C,
    stmt: &SelectStatement,
) -> Result<Vec<(ProductId, i64)>, DocumentError> {
    let rows = ProductQtyRow::find_by_statement(conn.get_database_backend().build(stmt))
        .all(conn)
        .await
        .map_err(document_error)?;
    Ok(rows.iter().map(ProductQtyRow::pair).collect())
}
