//! Property-based tests for branch visibility.
//!
//! - A branch-set visibility permits exactly its members.
//! - `ensure_permits` agrees with `permits`.
//! - An actor's own branch is always visible to it.

use proptest::prelude::*;
use uuid::Uuid;

use gudang_shared::types::{BranchId, CompanyId, UserId};

use crate::document::DocumentError;
use crate::scope::{Actor, Visibility};

fn branch() -> impl Strategy<Value = BranchId> {
    any::<u128>().prop_map(|n| BranchId::from_uuid(Uuid::from_u128(n)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_branch_set_permits_only_members(
        members in prop::collection::btree_set(branch(), 0..8),
        candidate in branch(),
    ) {
        let visibility = Visibility::Branches(members.clone());

        prop_assert_eq!(visibility.permits(candidate), members.contains(&candidate));
        for member in &members {
            prop_assert!(visibility.permits(*member));
        }
        prop_assert_eq!(visibility.is_empty(), members.is_empty());
    }

    #[test]
    fn prop_ensure_permits_matches_permits(
        members in prop::collection::btree_set(branch(), 0..8),
        candidate in branch(),
    ) {
        let visibility = Visibility::Branches(members);

        match visibility.ensure_permits(candidate) {
            Ok(()) => prop_assert!(visibility.permits(candidate)),
            Err(DocumentError::BranchNotVisible(denied)) => {
                prop_assert!(!visibility.permits(candidate));
                prop_assert_eq!(denied, candidate);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn prop_company_visibility_permits_any_branch(candidate in branch()) {
        prop_assert!(Visibility::Company.permits(candidate));
        prop_assert!(Visibility::Company.ensure_permits(candidate).is_ok());
    }

    #[test]
    fn prop_branch_actor_owns_its_branch(own in branch()) {
        let actor = Actor::branch(UserId::new(), CompanyId::new(), own);

        prop_assert_eq!(actor.owning_branch().unwrap(), own);
        prop_assert!(Visibility::branches([own]).permits(own));
    }
}
