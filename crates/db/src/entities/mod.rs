//! `SeaORM` entities for the fixed tables.
//!
//! Document header and detail tables differ per family and are accessed
//! through dynamic statements in [`crate::documents`] instead.

pub mod branches;
pub mod companies;
pub mod inventories;
pub mod products;
pub mod regions;
pub mod shelves;
