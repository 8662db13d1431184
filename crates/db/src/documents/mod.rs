//! Document engine over the eight header/detail families.
//!
//! - [`family`]: table layout per family and the compile-time markers
//! - [`store`]: sea-query statements against one family's tables
//! - [`engine`]: scoped, transactional list/get/create/update

pub mod engine;
pub mod family;
pub(crate) mod rows;
pub(crate) mod store;

pub use engine::{
    DeliveryEngine, DeliveryReturnEngine, DocumentEngine, EngineSettings, PurchaseEngine,
    PurchaseReturnEngine, ReceiveEngine, ReceiveReturnEngine, SalesOrderEngine,
    SalesOrderReturnEngine,
};
pub use family::{
    Delivery, DeliveryReturn, DocumentFamily, FamilyTables, Purchase, PurchaseReturn, Receive,
    ReceiveReturn, SalesOrder, SalesOrderReturn, parent_column, tables_for,
};
