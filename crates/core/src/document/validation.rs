//! Per-family validation of a decoded draft.
//!
//! Runs before any database work. Checks only what can be decided from the
//! draft and the family table; ownership and existence are checked by the
//! engine inside the transaction.

use std::collections::HashSet;

use rust_decimal::Decimal;

use super::error::DocumentError;
use super::kind::DocumentKind;
use super::types::{DetailDraft, DocumentDraft};

/// Validates a draft against the rules of its family.
///
/// # Errors
///
/// Returns a BadRequest-kind [`DocumentError`] for the first violated rule.
pub fn validate_draft(kind: DocumentKind, draft: &DocumentDraft) -> Result<(), DocumentError> {
    if kind.parent().is_some() && draft.parent_id.is_none() {
        return Err(DocumentError::MissingField("parent_id"));
    }

    if draft.disc.is_some_and(|disc| disc < Decimal::ZERO) {
        return Err(DocumentError::NegativeAmount("disc"));
    }

    let mut seen = HashSet::new();
    let mut line_codes = HashSet::new();
    for detail in &draft.details {
        if let Some(id) = detail.id
            && !seen.insert(id)
        {
            return Err(DocumentError::DuplicateDetail(id));
        }
        validate_detail(kind, detail)?;

        // A return line's ledger key is (product, code, document), so a
        // repeated pair on one return would collide in the ledger.
        if kind.is_return()
            && let Some(code) = detail.code.as_deref()
            && !line_codes.insert((detail.product_id, code))
        {
            return Err(DocumentError::DuplicateLineCode {
                product_id: detail.product_id,
                code: code.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_detail(kind: DocumentKind, detail: &DetailDraft) -> Result<(), DocumentError> {
    if detail.qty <= 0 {
        return Err(DocumentError::InvalidQuantity {
            product_id: detail.product_id,
            qty: detail.qty,
        });
    }

    if kind.is_priced() {
        let price = detail.price.ok_or(DocumentError::MissingField("price"))?;
        if price < Decimal::ZERO {
            return Err(DocumentError::NegativeAmount("price"));
        }
        if detail.disc.is_some_and(|disc| disc < Decimal::ZERO) {
            return Err(DocumentError::NegativeAmount("disc"));
        }
    }

    if kind.moves_stock() && detail.shelve_id.is_none() {
        return Err(DocumentError::MissingField("shelve_id"));
    }

    if kind.is_return() && detail.code.as_deref().is_none_or(str::is_empty) {
        return Err(DocumentError::MissingField("code"));
    }

    Ok(())
}
