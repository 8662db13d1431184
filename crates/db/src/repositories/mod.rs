//! Repository abstractions for data access.
//!
//! Stateless repositories expose associated functions generic over
//! [`sea_orm::ConnectionTrait`], so the engine can run them inside its own
//! transaction. The others hold a connection for standalone reads.

pub mod catalog;
pub mod codes;
pub mod inventory;
pub mod scope;

pub use catalog::CatalogRepository;
pub use codes::CodeGenerator;
pub use inventory::InventoryLedger;
pub use scope::ScopeRepository;
