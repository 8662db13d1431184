//! Actor identity and branch visibility.
//!
//! An [`Actor`] is handed to every engine call by the caller's auth layer.
//! Its [`Reach`] decides how many branches of the company it may see:
//! a branch actor sees one, a region actor sees the region's branches, and a
//! head-office actor sees the whole company. Region membership is resolved
//! per request by the storage layer into a [`Visibility`].

use std::collections::BTreeSet;

use gudang_shared::types::{BranchId, CompanyId, RegionId, UserId};
use serde::{Deserialize, Serialize};

use crate::document::DocumentError;

/// Initiator of an engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Acting user, recorded as `created_by`/`updated_by`.
    pub user_id: UserId,
    /// Company the actor works for. Always required.
    pub company_id: CompanyId,
    /// Region the actor is assigned to.
    pub region_id: Option<RegionId>,
    /// Branch the actor is assigned to.
    pub branch_id: Option<BranchId>,
}

/// How far an actor's visibility extends inside its company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    /// No region or branch: the whole company.
    HeadOffice,
    /// Every branch of one region.
    Region(RegionId),
    /// A single branch.
    Branch(BranchId),
}

impl Actor {
    /// Actor assigned to a single branch.
    #[must_use]
    pub const fn branch(user_id: UserId, company_id: CompanyId, branch_id: BranchId) -> Self {
        Self {
            user_id,
            company_id,
            region_id: None,
            branch_id: Some(branch_id),
        }
    }

    /// Actor assigned to a region.
    #[must_use]
    pub const fn region(user_id: UserId, company_id: CompanyId, region_id: RegionId) -> Self {
        Self {
            user_id,
            company_id,
            region_id: Some(region_id),
            branch_id: None,
        }
    }

    /// Head-office actor.
    #[must_use]
    pub const fn head_office(user_id: UserId, company_id: CompanyId) -> Self {
        Self {
            user_id,
            company_id,
            region_id: None,
            branch_id: None,
        }
    }

    /// The actor's reach. A branch assignment wins over a region.
    #[must_use]
    pub const fn reach(&self) -> Reach {
        match (self.branch_id, self.region_id) {
            (Some(branch), _) => Reach::Branch(branch),
            (None, Some(region)) => Reach::Region(region),
            (None, None) => Reach::HeadOffice,
        }
    }

    /// Branch that documents created by this actor belong to.
    ///
    /// # Errors
    ///
    /// Returns `HeadOfficeActor` when the actor has no branch.
    pub fn owning_branch(&self) -> Result<BranchId, DocumentError> {
        self.branch_id.ok_or(DocumentError::HeadOfficeActor)
    }
}

/// Set of branches an actor may read and write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Every branch of the company.
    Company,
    /// Only these branches. May be empty for a region without branches.
    Branches(BTreeSet<BranchId>),
}

impl Visibility {
    /// Visibility over the given branches.
    pub fn branches(ids: impl IntoIterator<Item = BranchId>) -> Self {
        Self::Branches(ids.into_iter().collect())
    }

    /// Returns true if documents of `branch` are visible.
    #[must_use]
    pub fn permits(&self, branch: BranchId) -> bool {
        match self {
            Self::Company => true,
            Self::Branches(ids) => ids.contains(&branch),
        }
    }

    /// Branch filter to AND into queries; `None` means unconstrained.
    #[must_use]
    pub const fn branch_ids(&self) -> Option<&BTreeSet<BranchId>> {
        match self {
            Self::Company => None,
            Self::Branches(ids) => Some(ids),
        }
    }

    /// Returns true if no branch at all is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Branches(ids) if ids.is_empty())
    }

    /// Fails unless `branch` is visible.
    ///
    /// # Errors
    ///
    /// Returns `BranchNotVisible` (Forbidden) otherwise.
    pub fn ensure_permits(&self, branch: BranchId) -> Result<(), DocumentError> {
        if self.permits(branch) {
            Ok(())
        } else {
            Err(DocumentError::BranchNotVisible(branch))
        }
    }
}
