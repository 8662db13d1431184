//! Document drafts, views and list filters.
//!
//! Drafts arrive already decoded by the caller; views are what the engine
//! hands back. Both are shared by all eight families, with the
//! family-specific columns left as `None` where a family lacks them.

use chrono::{DateTime, NaiveDate, Utc};
use gudang_shared::types::{
    BranchId, CompanyId, DetailId, DocumentId, PageRequest, ProductId, ShelveId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::DocumentKind;

/// Requested state of a document, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDraft {
    /// Document date.
    pub date: NaiveDate,
    /// Free-text remark.
    #[serde(default)]
    pub remark: Option<String>,
    /// Header-level discount.
    #[serde(default)]
    pub disc: Option<Decimal>,
    /// Upstream document; required for families that have a parent.
    #[serde(default)]
    pub parent_id: Option<DocumentId>,
    /// Supplier for purchases, customer for sales orders.
    #[serde(default)]
    pub partner_id: Option<Uuid>,
    /// Requested detail lines.
    #[serde(default)]
    pub details: Vec<DetailDraft>,
}

/// Requested state of one detail line.
///
/// A line without `id` is inserted; a line with `id` updates that detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailDraft {
    /// Existing detail id, absent for new lines.
    #[serde(default)]
    pub id: Option<DetailId>,
    /// Product moved or priced by this line.
    pub product_id: ProductId,
    /// Quantity, strictly positive.
    pub qty: i64,
    /// Unit price (priced families).
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Line discount (priced families).
    #[serde(default)]
    pub disc: Option<Decimal>,
    /// Storage bin (stock-moving families).
    #[serde(default)]
    pub shelve_id: Option<ShelveId>,
    /// Code of the originating line being returned (return families).
    #[serde(default)]
    pub code: Option<String>,
}

impl DocumentDraft {
    /// Draft dated `date` carrying `details` and nothing else.
    #[must_use]
    pub const fn new(date: NaiveDate, details: Vec<DetailDraft>) -> Self {
        Self {
            date,
            remark: None,
            disc: None,
            parent_id: None,
            partner_id: None,
            details,
        }
    }
}

impl DetailDraft {
    /// New line of `qty` units of `product_id`.
    #[must_use]
    pub const fn new(product_id: ProductId, qty: i64) -> Self {
        Self {
            id: None,
            product_id,
            qty,
            price: None,
            disc: None,
            shelve_id: None,
            code: None,
        }
    }
}

/// Persisted document header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeader {
    /// Document id.
    pub id: DocumentId,
    /// Family of the document.
    pub kind: DocumentKind,
    /// Generated code, unique per company.
    pub code: String,
    /// Document date.
    pub date: NaiveDate,
    /// Free-text remark.
    pub remark: Option<String>,
    /// Header-level discount.
    pub disc: Option<Decimal>,
    /// Supplier or customer.
    pub partner_id: Option<Uuid>,
    /// Upstream document.
    pub parent_id: Option<DocumentId>,
    /// Owning company.
    pub company_id: CompanyId,
    /// Owning branch.
    pub branch_id: BranchId,
    /// Creating user.
    pub created_by: UserId,
    /// Last updating user.
    pub updated_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Persisted detail line, without snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDetail {
    /// Detail id.
    pub id: DetailId,
    /// Owning header.
    pub document_id: DocumentId,
    /// Product.
    pub product_id: ProductId,
    /// Quantity.
    pub qty: i64,
    /// Unit price.
    pub price: Option<Decimal>,
    /// Line discount.
    pub disc: Option<Decimal>,
    /// Storage bin.
    pub shelve_id: Option<ShelveId>,
    /// Product-scoped line code.
    pub code: String,
}

/// Product fields copied into a detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product id.
    pub id: ProductId,
    /// Product code.
    pub code: String,
    /// Product name.
    pub name: String,
}

/// Shelve fields copied into a detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelveSnapshot {
    /// Shelve id.
    pub id: ShelveId,
    /// Shelve code.
    pub code: String,
}

/// Detail line with its referenced rows resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailView {
    /// Detail id.
    pub id: DetailId,
    /// Product snapshot.
    pub product: ProductSnapshot,
    /// Quantity.
    pub qty: i64,
    /// Unit price.
    pub price: Option<Decimal>,
    /// Line discount.
    pub disc: Option<Decimal>,
    /// Shelve snapshot, for stock-moving families.
    pub shelve: Option<ShelveSnapshot>,
    /// Product-scoped line code.
    pub code: String,
}

/// Reference to the upstream document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    /// Parent id.
    pub id: DocumentId,
    /// Parent family.
    pub kind: DocumentKind,
    /// Parent code.
    pub code: String,
    /// Parent date.
    pub date: NaiveDate,
}

/// Full document aggregate returned by get, create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Header.
    pub header: DocumentHeader,
    /// Upstream document, if any.
    pub parent: Option<ParentRef>,
    /// Detail lines, ordered by id.
    pub details: Vec<DetailView>,
}

/// One row of a document list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Header.
    pub header: DocumentHeader,
    /// Code of the parent document.
    pub parent_code: Option<String>,
    /// Code of the parent's own parent (e.g. the purchase behind a receive return).
    pub origin_code: Option<String>,
    /// Number of detail lines.
    pub line_count: u64,
    /// Sum of line quantities.
    pub total_qty: i64,
    /// Sum of `price * qty` (priced families).
    pub total_price: Option<Decimal>,
    /// Sum of line discounts (priced families).
    pub total_disc: Option<Decimal>,
}

/// Filters for listing documents. All filters are ANDed with the actor's
/// visible branches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFilter {
    /// Inclusive lower date bound.
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    /// Substring of the document code.
    #[serde(default)]
    pub code: Option<String>,
    /// Only documents created against this parent.
    #[serde(default)]
    pub parent_id: Option<DocumentId>,
    /// Only documents of this branch.
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    /// Page to return.
    #[serde(default)]
    pub page: PageRequest,
}

/// Returnable balance of one product against a parent document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnableLine {
    /// Product.
    pub product_id: ProductId,
    /// Quantity on the parent document.
    pub ordered: i64,
    /// Quantity already returned by return documents.
    pub returned: i64,
    /// Quantity still returnable.
    pub remaining: i64,
}
