//! Property-based tests for code sequencing.
//!
//! - Monotonicity: the next code sorts strictly after the latest, both
//!   numerically and as a string, so `ORDER BY code DESC` finds it.
//! - Round trip: the suffix of a generated code parses back to `latest + 1`.

use proptest::prelude::*;

use super::code::{next_code, parse_suffix};
use super::kind::{DOCUMENT_CODE_WIDTH, PRODUCT_CODE_WIDTH};

fn prefix() -> impl Strategy<Value = String> {
    ("(PO|PR|GR|RR|DO|DR|SO|SR)", 2000u32..2100, 1u32..=12)
        .prop_map(|(tag, year, month)| format!("{tag}{year}{month:02}"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_next_document_code_sorts_after_latest(prefix in prefix(), seq in 1u64..99_999) {
        let latest = format!("{prefix}{seq:05}");
        let next = next_code(&prefix, DOCUMENT_CODE_WIDTH, Some(&latest)).unwrap();

        prop_assert!(next > latest);
        prop_assert_eq!(next.len(), latest.len());
        prop_assert_eq!(parse_suffix(&prefix, DOCUMENT_CODE_WIDTH, &next).unwrap(), seq + 1);
    }

    #[test]
    fn prop_next_product_code_sorts_after_latest(
        prefix in prefix(),
        seq in 0u64..99_999_999_999_999,
    ) {
        let latest = format!("{prefix}{seq:014}");
        let next = next_code(&prefix, PRODUCT_CODE_WIDTH, Some(&latest)).unwrap();

        prop_assert!(next > latest);
        prop_assert_eq!(parse_suffix(&prefix, PRODUCT_CODE_WIDTH, &next).unwrap(), seq + 1);
    }

    #[test]
    fn prop_chained_codes_are_strictly_increasing(prefix in prefix(), steps in 1usize..50) {
        let mut latest: Option<String> = None;
        for _ in 0..steps {
            let next = next_code(&prefix, DOCUMENT_CODE_WIDTH, latest.as_deref()).unwrap();
            if let Some(previous) = &latest {
                prop_assert!(&next > previous);
            }
            latest = Some(next);
        }
        let last = latest.unwrap();
        prop_assert_eq!(parse_suffix(&prefix, DOCUMENT_CODE_WIDTH, &last).unwrap(), steps as u64);
    }
}
