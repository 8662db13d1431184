//! Shared fixture for the document engine integration tests.
//!
//! Every test gets its own in-memory SQLite database with the real schema
//! and a small organization:
//!
//! ```text
//! company ─┬─ region "Java" ─┬─ branch north (2 shelves)
//!          │                 └─ branch south (1 shelve)
//!          └─ branch east (no region, 1 shelve)
//! ```

#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use gudang_core::document::{DetailDraft, DocumentDraft};
use gudang_core::scope::Actor;
use gudang_db::documents::{DocumentEngine, DocumentFamily, EngineSettings};
use gudang_db::entities::{branches, companies, products, regions, shelves};
use gudang_db::migration::{Migrator, MigratorTrait};
use gudang_shared::config::DatabaseConfig;
use gudang_shared::types::{BranchId, CompanyId, DocumentId, ProductId, RegionId, ShelveId, UserId};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

/// Fixed engine clock: every generated code falls in October 2026.
pub fn clock() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).expect("valid date")
}

/// Document date used by the drafts.
pub fn doc_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).expect("valid date")
}

/// Seeded organization.
pub struct Fixture {
    pub db: DatabaseConnection,
    pub user: UserId,
    pub company: CompanyId,
    pub region: RegionId,
    pub empty_region: RegionId,
    pub north: BranchId,
    pub south: BranchId,
    pub east: BranchId,
    pub north_shelf: ShelveId,
    pub north_overflow: ShelveId,
    pub south_shelf: ShelveId,
    pub east_shelf: ShelveId,
    pub soap: ProductId,
    pub rice: ProductId,
}

impl Fixture {
    /// Engine of family `F` running on the fixture database.
    pub fn engine<F: DocumentFamily>(&self) -> DocumentEngine<F> {
        DocumentEngine::new(self.db.clone(), EngineSettings::default()).with_clock(clock)
    }

    pub fn north_actor(&self) -> Actor {
        Actor::branch(self.user, self.company, self.north)
    }

    pub fn south_actor(&self) -> Actor {
        Actor::branch(self.user, self.company, self.south)
    }

    pub fn east_actor(&self) -> Actor {
        Actor::branch(self.user, self.company, self.east)
    }

    pub fn region_actor(&self) -> Actor {
        Actor::region(self.user, self.company, self.region)
    }

    pub fn head_office(&self) -> Actor {
        Actor::head_office(self.user, self.company)
    }
}

/// Opens a fresh database, runs the migrations and seeds the organization.
pub async fn setup() -> Fixture {
    let db = gudang_db::connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    })
    .await
    .expect("Failed to open in-memory database");

    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let company = insert_company(&db, "PT Gudang Makmur").await;
    let region = insert_region(&db, company, "Java").await;
    let empty_region = insert_region(&db, company, "Papua").await;
    let north = insert_branch(&db, company, Some(region), "JKT").await;
    let south = insert_branch(&db, company, Some(region), "SBY").await;
    let east = insert_branch(&db, company, None, "MDN").await;

    Fixture {
        user: UserId::new(),
        company,
        region,
        empty_region,
        north,
        south,
        east,
        north_shelf: insert_shelve(&db, company, north, "A-01").await,
        north_overflow: insert_shelve(&db, company, north, "B-07").await,
        south_shelf: insert_shelve(&db, company, south, "A-01").await,
        east_shelf: insert_shelve(&db, company, east, "A-01").await,
        soap: insert_product(&db, company, "SKU-SOAP", "Bar soap 90g").await,
        rice: insert_product(&db, company, "SKU-RICE", "Rice 5kg").await,
        db,
    }
}

pub async fn insert_company(db: &DatabaseConnection, name: &str) -> CompanyId {
    let id = Uuid::now_v7();
    companies::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert company");
    CompanyId::from_uuid(id)
}

async fn insert_region(db: &DatabaseConnection, company: CompanyId, name: &str) -> RegionId {
    let id = Uuid::now_v7();
    regions::ActiveModel {
        id: Set(id),
        company_id: Set(company.into_inner()),
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert region");
    RegionId::from_uuid(id)
}

pub async fn insert_branch(
    db: &DatabaseConnection,
    company: CompanyId,
    region: Option<RegionId>,
    code: &str,
) -> BranchId {
    let id = Uuid::now_v7();
    branches::ActiveModel {
        id: Set(id),
        company_id: Set(company.into_inner()),
        region_id: Set(region.map(RegionId::into_inner)),
        code: Set(code.to_string()),
        name: Set(format!("Branch {code}")),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert branch");
    BranchId::from_uuid(id)
}

async fn insert_shelve(
    db: &DatabaseConnection,
    company: CompanyId,
    branch: BranchId,
    code: &str,
) -> ShelveId {
    let id = Uuid::now_v7();
    shelves::ActiveModel {
        id: Set(id),
        company_id: Set(company.into_inner()),
        branch_id: Set(branch.into_inner()),
        code: Set(code.to_string()),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert shelve");
    ShelveId::from_uuid(id)
}

async fn insert_product(
    db: &DatabaseConnection,
    company: CompanyId,
    code: &str,
    name: &str,
) -> ProductId {
    let id = Uuid::now_v7();
    products::ActiveModel {
        id: Set(id),
        company_id: Set(company.into_inner()),
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert product");
    ProductId::from_uuid(id)
}

/// Priced line for purchases and sales orders.
pub fn priced(product: ProductId, qty: i64, price: i64) -> DetailDraft {
    DetailDraft {
        price: Some(Decimal::from(price)),
        ..DetailDraft::new(product, qty)
    }
}

/// Stock line for receipts and deliveries.
pub fn stocked(product: ProductId, qty: i64, shelve: ShelveId) -> DetailDraft {
    DetailDraft {
        shelve_id: Some(shelve),
        ..DetailDraft::new(product, qty)
    }
}

/// Draft pointing at `parent`.
pub fn child_draft(parent: DocumentId, details: Vec<DetailDraft>) -> DocumentDraft {
    DocumentDraft {
        parent_id: Some(parent),
        ..DocumentDraft::new(doc_date(), details)
    }
}
