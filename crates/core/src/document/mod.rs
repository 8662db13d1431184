//! Header/detail document model shared by the eight document families.
//!
//! This module contains the storage-free half of the document engine:
//! - Family table (tags, parents, stock direction)
//! - Drafts, views and list filters
//! - Draft validation
//! - Detail reconciliation
//! - Code sequencing
//! - Return-quantity bound
//! - Error types for document operations

pub mod code;
pub mod error;
pub mod kind;
pub mod reconcile;
pub mod returns;
pub mod types;
pub mod validation;

#[cfg(test)]
mod code_props;
#[cfg(test)]
mod reconcile_props;
#[cfg(test)]
mod returns_props;

pub use code::{code_prefix, next_code, parse_suffix};
pub use error::{DocumentError, ErrorKind};
pub use kind::{DOCUMENT_CODE_WIDTH, Direction, DocumentKind, PRODUCT_CODE_WIDTH};
pub use reconcile::{DetailReconciler, Identified, Reconciliation};
pub use returns::{ReturnBalance, check_line_codes};
pub use types::{
    DetailDraft, DetailView, Document, DocumentDetail, DocumentDraft, DocumentFilter,
    DocumentHeader, DocumentSummary, ParentRef, ProductSnapshot, ReturnableLine, ShelveSnapshot,
};
pub use validation::validate_draft;
