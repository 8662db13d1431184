//! Per-request resolution of an actor's visible branches.

use gudang_core::document::DocumentError;
use gudang_core::scope::{Actor, Reach, Visibility};
use gudang_shared::types::BranchId;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
};
use uuid::Uuid;

use crate::entities::branches;
use crate::error::document_error;

/// Scope repository. Region membership is read on every call and never
/// cached, since branches may move between regions between requests.
#[derive(Debug, Clone)]
pub struct ScopeRepository {
    db: DatabaseConnection,
}

impl ScopeRepository {
    /// Creates a new scope repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves the branches `actor` may see.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn visibility(&self, actor: &Actor) -> Result<Visibility, DocumentError> {
        Self::visibility_in(&self.db, actor).await
    }

    /// Resolves the branches `actor` may see using `conn`, which may be an
    /// open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn visibility_in<C: ConnectionTrait>(
        conn: &C,
        actor: &Actor,
    ) -> Result<Visibility, DocumentError> {
        match actor.reach() {
            Reach::HeadOffice => Ok(Visibility::Company),
            Reach::Branch(branch) => Ok(Visibility::branches([branch])),
            Reach::Region(region) => {
                let ids: Vec<Uuid> = branches::Entity::find()
                    .filter(branches::Column::CompanyId.eq(actor.company_id.into_inner()))
                    .filter(branches::Column::RegionId.eq(region.into_inner()))
                    .select_only()
                    .column(branches::Column::Id)
                    .into_tuple()
                    .all(conn)
                    .await
                    .map_err(document_error)?;

                Ok(Visibility::branches(ids.into_iter().map(BranchId::from_uuid)))
            }
        }
    }
}
