//! Ledger keys, postings and stock arithmetic.

use chrono::NaiveDate;
use gudang_shared::types::{BranchId, CompanyId, DocumentId, ProductId, ShelveId};
use serde::{Deserialize, Serialize};

use crate::document::{Direction, DocumentKind};

/// Composite key linking a ledger row to the detail that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerKey {
    /// Product of the detail.
    pub product_id: ProductId,
    /// Product-scoped line code of the detail.
    pub product_code: String,
    /// Owning document.
    pub transaction_id: DocumentId,
    /// Owning document family, persisted as its tag.
    pub kind: DocumentKind,
}

/// Full ledger row to write for one stock-moving detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Composite key.
    pub key: LedgerKey,
    /// Owning company.
    pub company_id: CompanyId,
    /// Owning branch.
    pub branch_id: BranchId,
    /// Storage bin.
    pub shelve_id: ShelveId,
    /// Code of the owning document.
    pub transaction_code: String,
    /// Date of the owning document.
    pub transaction_date: NaiveDate,
    /// Stock direction.
    pub direction: Direction,
    /// Quantity moved.
    pub qty: i64,
}

/// A persisted movement, as read back from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Stock direction.
    pub direction: Direction,
    /// Quantity moved.
    pub qty: i64,
}

/// Net stock of a set of movements: inbound minus outbound.
pub fn net_quantity(movements: impl IntoIterator<Item = StockMovement>) -> i64 {
    movements
        .into_iter()
        .fold(0i64, |acc, movement| match movement.direction {
            Direction::In => acc.saturating_add(movement.qty),
            Direction::Out => acc.saturating_sub(movement.qty),
        })
}
