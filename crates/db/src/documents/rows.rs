//! Raw query rows of the family tables and their conversion into domain
//! views.
//!
//! Columns a family does not have are projected as `NULL` under the same
//! alias, so one row type serves all eight families.

use chrono::{DateTime, NaiveDate, Utc};
use gudang_core::document::{DocumentDetail, DocumentHeader, DocumentKind, ParentRef};
use gudang_shared::types::{
    BranchId, CompanyId, DetailId, DocumentId, ProductId, ShelveId, UserId,
};
use rust_decimal::Decimal;
use sea_orm::FromQueryResult;
use uuid::Uuid;

/// Header row joined with its parent and the parent's parent.
#[derive(Debug, Clone, FromQueryResult)]
pub struct HeaderRow {
    pub id: Uuid,
    pub code: String,
    pub date: NaiveDate,
    pub remark: Option<String>,
    pub disc: Option<Decimal>,
    pub partner_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub parent_code: Option<String>,
    pub parent_date: Option<NaiveDate>,
    pub origin_code: Option<String>,
}

impl HeaderRow {
    /// Owning branch.
    pub const fn branch(&self) -> BranchId {
        BranchId::from_uuid(self.branch_id)
    }

    /// Converts into the domain header of `kind`.
    pub fn header(&self, kind: DocumentKind) -> DocumentHeader {
        DocumentHeader {
            id: DocumentId::from_uuid(self.id),
            kind,
            code: self.code.clone(),
            date: self.date,
            remark: self.remark.clone(),
            disc: self.disc,
            partner_id: self.partner_id,
            parent_id: self.parent_id.map(DocumentId::from_uuid),
            company_id: CompanyId::from_uuid(self.company_id),
            branch_id: self.branch(),
            created_by: UserId::from_uuid(self.created_by),
            updated_by: UserId::from_uuid(self.updated_by),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Parent reference, when the family has a parent and it was joined.
    pub fn parent(&self, kind: DocumentKind) -> Option<ParentRef> {
        match (kind.parent(), self.parent_id, &self.parent_code, self.parent_date) {
            (Some(parent_kind), Some(id), Some(code), Some(date)) => Some(ParentRef {
                id: DocumentId::from_uuid(id),
                kind: parent_kind,
                code: code.clone(),
                date,
            }),
            _ => None,
        }
    }
}

/// Detail row.
#[derive(Debug, Clone, FromQueryResult)]
pub struct DetailRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub product_id: Uuid,
    pub qty: i64,
    pub price: Option<Decimal>,
    pub disc: Option<Decimal>,
    pub shelve_id: Option<Uuid>,
    pub code: String,
}

impl From<DetailRow> for DocumentDetail {
    fn from(row: DetailRow) -> Self {
        Self {
            id: DetailId::from_uuid(row.id),
            document_id: DocumentId::from_uuid(row.document_id),
            product_id: ProductId::from_uuid(row.product_id),
            qty: row.qty,
            price: row.price,
            disc: row.disc,
            shelve_id: row.shelve_id.map(ShelveId::from_uuid),
            code: row.code,
        }
    }
}

/// Per-document detail aggregate for list views.
#[derive(Debug, Clone, FromQueryResult)]
pub struct AggregateRow {
    pub document_id: Uuid,
    pub line_count: i64,
    pub total_qty: Option<i64>,
    pub total_price: Option<Decimal>,
    pub total_disc: Option<Decimal>,
}

/// `COUNT(*)` result.
#[derive(Debug, FromQueryResult)]
pub struct CountRow {
    pub total: i64,
}

/// Quantity summed per product.
#[derive(Debug, FromQueryResult)]
pub struct ProductQtyRow {
    pub product_id: Uuid,
    pub qty: i64,
}

impl ProductQtyRow {
    /// As a `(product, qty)` pair.
    pub const fn pair(&self) -> (ProductId, i64) {
        (ProductId::from_uuid(self.product_id), self.qty)
    }
}

/// Product and line code of one detail.
#[derive(Debug, FromQueryResult)]
pub struct LineCodeRow {
    pub product_id: Uuid,
    pub code: String,
}
