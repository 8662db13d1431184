//! Property-based tests for the return-quantity bound.
//!
//! - Bound: a request is accepted iff, for every product, its summed
//!   quantity is at most `ordered - returned`.
//! - Exhaustion: returning exactly the remaining balance leaves nothing.

use proptest::prelude::*;
use uuid::Uuid;

use gudang_shared::types::ProductId;

use super::returns::ReturnBalance;

fn product(n: u64) -> ProductId {
    ProductId::from_uuid(Uuid::from_u64_pair(7, n))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_check_matches_bound(
        ordered in 1i64..1_000,
        returned in 0i64..1_000,
        requested in prop::collection::vec(1i64..200, 1..5),
    ) {
        let item = product(1);
        let balance = ReturnBalance::new([(item, ordered)], [(item, returned)]);
        let total: i64 = requested.iter().sum();

        let accepted = balance.check(requested.iter().map(|qty| (item, *qty))).is_ok();

        prop_assert_eq!(accepted, total <= (ordered - returned).max(0));
    }

    #[test]
    fn prop_returning_remaining_exhausts_balance(
        ordered in 1i64..1_000,
        returned_share in 0u32..100,
    ) {
        let item = product(2);
        let returned = ordered * i64::from(returned_share) / 100;
        let balance = ReturnBalance::new([(item, ordered)], [(item, returned)]);
        let remaining = balance.remaining(item);

        prop_assert_eq!(remaining, ordered - returned);
        if remaining > 0 {
            prop_assert!(balance.check([(item, remaining)]).is_ok());
        }

        let after = ReturnBalance::new([(item, ordered)], [(item, returned), (item, remaining)]);
        prop_assert_eq!(after.remaining(item), 0);
        prop_assert!(after.check([(item, 1)]).is_err());
    }

    #[test]
    fn prop_products_are_independent(a_ordered in 1i64..100, b_ordered in 1i64..100) {
        let (a, b) = (product(3), product(4));
        let balance = ReturnBalance::new([(a, a_ordered), (b, b_ordered)], []);

        prop_assert!(balance.check([(a, a_ordered), (b, b_ordered)]).is_ok());
        prop_assert!(balance.check([(a, a_ordered + 1), (b, 1)]).is_err());
    }
}
