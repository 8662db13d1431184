//! Detail reconciliation.
//!
//! Classifies the requested lines of an update against the ids currently
//! persisted for the header. This is a set difference by identifier, not a
//! content diff: every line with an id is an update, whatever it contains.

use std::collections::HashSet;

use gudang_shared::types::DetailId;

use super::error::DocumentError;
use super::types::DetailDraft;

/// A requested line that may carry the id of an existing detail.
pub trait Identified {
    /// Id of the existing detail, or `None` for a new line.
    fn detail_id(&self) -> Option<DetailId>;
}

impl Identified for DetailDraft {
    fn detail_id(&self) -> Option<DetailId> {
        self.id
    }
}

/// Outcome of reconciling one detail collection.
#[derive(Debug, PartialEq, Eq)]
pub struct Reconciliation<'a, T> {
    /// New lines, in request order.
    pub to_insert: Vec<&'a T>,
    /// Existing lines to overwrite, in request order.
    pub to_update: Vec<(DetailId, &'a T)>,
    /// Existing ids absent from the request, in persisted order.
    pub to_delete: Vec<DetailId>,
}

impl<T> Reconciliation<'_, T> {
    /// Ids of existing details kept by the update.
    #[must_use]
    pub fn retained_ids(&self) -> Vec<DetailId> {
        self.to_update.iter().map(|(id, _)| *id).collect()
    }
}

/// Computes insert/update/delete sets for a detail collection.
pub struct DetailReconciler;

impl DetailReconciler {
    /// Reconciles `requested` against the `existing` persisted ids.
    ///
    /// # Errors
    ///
    /// - `DetailNotFound` if a requested id is not among `existing`.
    /// - `DuplicateDetail` if the same id is requested twice.
    pub fn reconcile<'a, T: Identified>(
        existing: &[DetailId],
        requested: &'a [T],
    ) -> Result<Reconciliation<'a, T>, DocumentError> {
        let persisted: HashSet<DetailId> = existing.iter().copied().collect();
        let mut claimed = HashSet::with_capacity(requested.len());
        let mut to_insert = Vec::new();
        let mut to_update = Vec::new();

        for line in requested {
            match line.detail_id() {
                None => to_insert.push(line),
                Some(id) => {
                    if !persisted.contains(&id) {
                        return Err(DocumentError::DetailNotFound(id));
                    }
                    if !claimed.insert(id) {
                        return Err(DocumentError::DuplicateDetail(id));
                    }
                    to_update.push((id, line));
                }
            }
        }

        let to_delete = existing
            .iter()
            .copied()
            .filter(|id| !claimed.contains(id))
            .collect();

        Ok(Reconciliation {
            to_insert,
            to_update,
            to_delete,
        })
    }
}
