//! Core business logic for Gudang.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Document rules, scoping and ledger types live here; `gudang-db` executes them.
//!
//! # Modules
//!
//! - `document` - Document families, drafts, reconciliation, codes, return bounds
//! - `inventory` - Inventory ledger keys and postings
//! - `scope` - Actor identity and branch visibility

pub mod document;
pub mod inventory;
pub mod scope;

#[cfg(test)]
mod scope_props;
