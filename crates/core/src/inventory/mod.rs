//! Inventory ledger types.
//!
//! A ledger row mirrors exactly one stock-moving document detail and is
//! addressed by its [`LedgerKey`], never by its own id.

pub mod types;

pub use types::{LedgerKey, Posting, StockMovement, net_quantity};
