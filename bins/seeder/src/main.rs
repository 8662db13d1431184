//! Database seeder for Gudang development and testing.
//!
//! Seeds a demo company with one region, one branch, a shelve and two
//! products, then pushes a purchase and its goods receipt through the
//! document engine so the ledger has something to show.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::Utc;
use gudang_core::document::{DetailDraft, DocumentDraft};
use gudang_core::scope::Actor;
use gudang_db::documents::{EngineSettings, PurchaseEngine, ReceiveEngine};
use gudang_db::entities::{branches, companies, products, regions, shelves};
use gudang_db::InventoryLedger;
use gudang_shared::config::LoggingConfig;
use gudang_shared::types::{BranchId, CompanyId, ProductId, ShelveId, UserId};
use gudang_shared::AppConfig;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Demo ids, stable across runs.
const COMPANY_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);
const REGION_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);
const BRANCH_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0003);
const SHELVE_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0004);
const SOAP_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0005);
const RICE_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0006);
const USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0007);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = gudang_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    if companies::Entity::find_by_id(COMPANY_ID).one(&db).await?.is_some() {
        info!("demo company already exists, skipping");
        return Ok(());
    }

    seed_organization(&db).await?;
    seed_documents(&db, EngineSettings::from(&config.engine)).await?;

    info!("seeding complete");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Company, region, branch, shelve and products.
async fn seed_organization(db: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now();

    companies::ActiveModel {
        id: Set(COMPANY_ID),
        name: Set("PT Gudang Demo".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    regions::ActiveModel {
        id: Set(REGION_ID),
        company_id: Set(COMPANY_ID),
        name: Set("Java".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    branches::ActiveModel {
        id: Set(BRANCH_ID),
        company_id: Set(COMPANY_ID),
        region_id: Set(Some(REGION_ID)),
        code: Set("JKT".to_string()),
        name: Set("Jakarta".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    shelves::ActiveModel {
        id: Set(SHELVE_ID),
        company_id: Set(COMPANY_ID),
        branch_id: Set(BRANCH_ID),
        code: Set("A-01".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    for (id, code, name) in [
        (SOAP_ID, "SKU-SOAP", "Bar soap 90g"),
        (RICE_ID, "SKU-RICE", "Rice 5kg"),
    ] {
        products::ActiveModel {
            id: Set(id),
            company_id: Set(COMPANY_ID),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
    }

    info!("organization seeded");
    Ok(())
}

/// A purchase of both products and a receipt of the full quantity.
async fn seed_documents(db: &DatabaseConnection, settings: EngineSettings) -> anyhow::Result<()> {
    let company = CompanyId::from_uuid(COMPANY_ID);
    let branch = BranchId::from_uuid(BRANCH_ID);
    let shelve = ShelveId::from_uuid(SHELVE_ID);
    let actor = Actor::branch(UserId::from_uuid(USER_ID), company, branch);
    let today = Utc::now().date_naive();

    let lines = [
        (ProductId::from_uuid(SOAP_ID), 120, 3_500),
        (ProductId::from_uuid(RICE_ID), 40, 72_000),
    ];

    let purchase = PurchaseEngine::new(db.clone(), settings)
        .create(
            &actor,
            DocumentDraft {
                remark: Some("Opening stock".to_string()),
                ..DocumentDraft::new(
                    today,
                    lines
                        .iter()
                        .map(|(product, qty, price)| DetailDraft {
                            price: Some(Decimal::from(*price)),
                            ..DetailDraft::new(*product, *qty)
                        })
                        .collect(),
                )
            },
        )
        .await?;
    info!(code = %purchase.header.code, "purchase seeded");

    let receive = ReceiveEngine::new(db.clone(), settings)
        .create(
            &actor,
            DocumentDraft {
                parent_id: Some(purchase.header.id),
                ..DocumentDraft::new(
                    today,
                    lines
                        .iter()
                        .map(|(product, qty, _)| DetailDraft {
                            shelve_id: Some(shelve),
                            ..DetailDraft::new(*product, *qty)
                        })
                        .collect(),
                )
            },
        )
        .await?;
    info!(code = %receive.header.code, "goods receipt seeded");

    let ledger = InventoryLedger::new(db.clone());
    for (product, _, _) in lines {
        let on_hand = ledger.stock_on_hand(company, branch, product).await?;
        info!(product_id = %product, on_hand, "stock on hand");
    }

    Ok(())
}
