//! Property-based tests for the detail reconciler.
//!
//! - Completeness: after applying a reconciliation the persisted id set is
//!   exactly `(existing - deleted) ∪ inserted`.
//! - Partition: every existing id is either updated or deleted, never both.

use std::collections::BTreeSet;

use proptest::prelude::*;
use uuid::Uuid;

use gudang_shared::types::DetailId;

use super::reconcile::{DetailReconciler, Identified};

#[derive(Debug, Clone)]
struct Line(Option<DetailId>);

impl Identified for Line {
    fn detail_id(&self) -> Option<DetailId> {
        self.0
    }
}

/// Strategy producing existing ids plus a request that keeps a random
/// subset of them (shuffled) and adds some new lines.
fn scenario() -> impl Strategy<Value = (Vec<DetailId>, Vec<Line>)> {
    (0usize..12, 0usize..6)
        .prop_flat_map(|(existing, new_lines)| {
            (
                Just(existing),
                prop::collection::vec(any::<bool>(), existing),
                Just(new_lines),
                any::<u64>(),
            )
        })
        .prop_map(|(existing, keep_mask, new_lines, seed)| {
            let ids: Vec<DetailId> = (0..existing)
                .map(|i| DetailId::from_uuid(Uuid::from_u64_pair(seed, i as u64)))
                .collect();
            let mut lines: Vec<Line> = ids
                .iter()
                .zip(&keep_mask)
                .filter(|(_, keep)| **keep)
                .map(|(id, _)| Line(Some(*id)))
                .collect();
            lines.extend((0..new_lines).map(|_| Line(None)));
            if seed % 2 == 0 {
                lines.reverse();
            }
            (ids, lines)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_reconciliation_is_complete((existing, requested) in scenario()) {
        let plan = DetailReconciler::reconcile(&existing, &requested).unwrap();

        let deleted: BTreeSet<DetailId> = plan.to_delete.iter().copied().collect();
        let survivors: BTreeSet<DetailId> = existing
            .iter()
            .copied()
            .filter(|id| !deleted.contains(id))
            .collect();
        let requested_ids: BTreeSet<DetailId> =
            requested.iter().filter_map(|line| line.0).collect();

        prop_assert_eq!(survivors, requested_ids);
        prop_assert_eq!(
            plan.to_insert.len(),
            requested.iter().filter(|line| line.0.is_none()).count()
        );
    }

    #[test]
    fn prop_existing_ids_are_partitioned((existing, requested) in scenario()) {
        let plan = DetailReconciler::reconcile(&existing, &requested).unwrap();

        let updated: BTreeSet<DetailId> = plan.retained_ids().into_iter().collect();
        let deleted: BTreeSet<DetailId> = plan.to_delete.iter().copied().collect();

        prop_assert!(updated.is_disjoint(&deleted));
        prop_assert_eq!(updated.len() + deleted.len(), existing.len());
    }

    #[test]
    fn prop_foreign_id_always_fails((existing, mut requested) in scenario(), salt in any::<u64>()) {
        let foreign = DetailId::from_uuid(Uuid::from_u64_pair(u64::MAX, salt));
        prop_assume!(!existing.contains(&foreign));
        requested.push(Line(Some(foreign)));

        prop_assert!(DetailReconciler::reconcile(&existing, &requested).is_err());
    }
}
