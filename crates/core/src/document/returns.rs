//! Return-quantity bound.
//!
//! For every product, the quantity requested by a return document must not
//! exceed what is on the parent document minus what other return documents
//! have already returned against the same parent.

use std::collections::{BTreeMap, HashSet};

use gudang_shared::types::ProductId;

use super::error::DocumentError;
use super::types::{DetailDraft, ReturnableLine};

/// Per-product returnable balance of one parent document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnBalance {
    ordered: BTreeMap<ProductId, i64>,
    returned: BTreeMap<ProductId, i64>,
}

impl ReturnBalance {
    /// Builds the balance from parent lines and already-returned lines.
    /// Repeated products are summed.
    pub fn new(
        ordered: impl IntoIterator<Item = (ProductId, i64)>,
        returned: impl IntoIterator<Item = (ProductId, i64)>,
    ) -> Self {
        Self {
            ordered: sum_by_product(ordered),
            returned: sum_by_product(returned),
        }
    }

    /// Quantity of `product` still returnable. Products absent from the
    /// parent have nothing to return.
    #[must_use]
    pub fn remaining(&self, product: ProductId) -> i64 {
        let ordered = self.ordered.get(&product).copied().unwrap_or(0);
        let returned = self.returned.get(&product).copied().unwrap_or(0);
        ordered.saturating_sub(returned).max(0)
    }

    /// Checks a requested set of return lines against the balance.
    ///
    /// # Errors
    ///
    /// Returns `ReturnQuantityExceeded` for the first product whose summed
    /// request exceeds its remaining quantity.
    pub fn check(
        &self,
        requested: impl IntoIterator<Item = (ProductId, i64)>,
    ) -> Result<(), DocumentError> {
        for (product_id, requested) in sum_by_product(requested) {
            let remaining = self.remaining(product_id);
            if requested > remaining {
                return Err(DocumentError::ReturnQuantityExceeded {
                    product_id,
                    requested,
                    remaining,
                });
            }
        }
        Ok(())
    }

    /// Checks that the parent still holds at least what was returned for
    /// every product. Used when the parent itself changes.
    ///
    /// # Errors
    ///
    /// Returns `ReturnedBeyondParent` for the first product returned beyond
    /// its ordered quantity.
    pub fn ensure_covered(&self) -> Result<(), DocumentError> {
        for (product_id, returned) in &self.returned {
            let ordered = self.ordered.get(product_id).copied().unwrap_or(0);
            if *returned > ordered {
                return Err(DocumentError::ReturnedBeyondParent {
                    product_id: *product_id,
                    ordered,
                    returned: *returned,
                });
            }
        }
        Ok(())
    }

    /// Balance per product on the parent, in product order.
    #[must_use]
    pub fn lines(&self) -> Vec<ReturnableLine> {
        self.ordered
            .iter()
            .map(|(product_id, ordered)| ReturnableLine {
                product_id: *product_id,
                ordered: *ordered,
                returned: self.returned.get(product_id).copied().unwrap_or(0),
                remaining: self.remaining(*product_id),
            })
            .collect()
    }
}

fn sum_by_product(lines: impl IntoIterator<Item = (ProductId, i64)>) -> BTreeMap<ProductId, i64> {
    let mut sums = BTreeMap::new();
    for (product, qty) in lines {
        let entry = sums.entry(product).or_insert(0i64);
        *entry = entry.saturating_add(qty);
    }
    sums
}

/// Checks that every return line names a line code present on the parent
/// for the same product.
///
/// # Errors
///
/// Returns `UnknownLineCode` for the first line whose `(product, code)` pair
/// is not on the parent, and `MissingField("code")` for a line without code.
pub fn check_line_codes<'a>(
    parent_lines: impl IntoIterator<Item = (ProductId, &'a str)>,
    requested: &[DetailDraft],
) -> Result<(), DocumentError> {
    let known: HashSet<(ProductId, &str)> = parent_lines.into_iter().collect();

    for line in requested {
        let code = line
            .code
            .as_deref()
            .ok_or(DocumentError::MissingField("code"))?;
        if !known.contains(&(line.product_id, code)) {
            return Err(DocumentError::UnknownLineCode {
                product_id: line.product_id,
                code: code.to_string(),
            });
        }
    }
    Ok(())
}
