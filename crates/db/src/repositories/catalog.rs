//! Product and shelve lookups used while writing document details.

use std::collections::HashMap;

use gudang_core::document::{DocumentError, ProductSnapshot, ShelveSnapshot};
use gudang_shared::types::{BranchId, CompanyId, ProductId, ShelveId};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{products, shelves};
use crate::error::document_error;

/// Catalog lookups. Stateless; every call runs on the caller's connection so
/// that it sees the same transaction as the surrounding writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    /// Loads a product of `company`.
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if the product does not exist in the company.
    pub async fn product<C: ConnectionTrait>(
        conn: &C,
        company: CompanyId,
        id: ProductId,
    ) -> Result<products::Model, DocumentError> {
        products::Entity::find_by_id(id.into_inner())
            .filter(products::Column::CompanyId.eq(company.into_inner()))
            .one(conn)
            .await
            .map_err(document_error)?
            .ok_or(DocumentError::ProductNotFound(id))
    }

    /// Loads a shelve that must belong to `company` and `branch`.
    ///
    /// # Errors
    ///
    /// Returns `ShelveNotFound` if the shelve does not exist in that branch.
    pub async fn shelve<C: ConnectionTrait>(
        conn: &C,
        company: CompanyId,
        branch: BranchId,
        id: ShelveId,
    ) -> Result<shelves::Model, DocumentError> {
        shelves::Entity::find_by_id(id.into_inner())
            .filter(shelves::Column::CompanyId.eq(company.into_inner()))
            .filter(shelves::Column::BranchId.eq(branch.into_inner()))
            .one(conn)
            .await
            .map_err(document_error)?
            .ok_or(DocumentError::ShelveNotFound(id))
    }

    /// Product snapshots keyed by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn product_snapshots<C: ConnectionTrait>(
        conn: &C,
        ids: impl IntoIterator<Item = ProductId>,
    ) -> Result<HashMap<ProductId, ProductSnapshot>, DocumentError> {
        let ids: Vec<Uuid> = ids.into_iter().map(ProductId::into_inner).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = products::Entity::find()
            .filter(products::Column::Id.is_in(ids))
            .all(conn)
            .await
            .map_err(document_error)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = ProductId::from_uuid(row.id);
                (
                    id,
                    ProductSnapshot {
                        id,
                        code: row.code,
                        name: row.name,
                    },
                )
            })
            .collect())
    }

    /// Shelve snapshots keyed by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn shelve_snapshots<C: ConnectionTrait>(
        conn: &C,
        ids: impl IntoIterator<Item = ShelveId>,
    ) -> Result<HashMap<ShelveId, ShelveSnapshot>, DocumentError> {
        let ids: Vec<Uuid> = ids.into_iter().map(ShelveId::into_inner).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = shelves::Entity::find()
            .filter(shelves::Column::Id.is_in(ids))
            .all(conn)
            .await
            .map_err(document_error)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = ShelveId::from_uuid(row.id);
                (id, ShelveSnapshot { id, code: row.code })
            })
            .collect())
    }
}
