//! Property tests for GST tax computation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::tax::{Jurisdiction, TaxSplit, compute_total_tax, taxable_value};

/// Strategy for monetary amounts with two decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for GST rate percentages (0-100, two decimal places).
fn gst_rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|n| Decimal::new(n, 2))
}

fn jurisdiction_strategy() -> impl Strategy<Value = Jurisdiction> {
    prop_oneof![Just(Jurisdiction::IntraState), Just(Jurisdiction::InterState)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The split components always sum back to the total tax.
    #[test]
    fn prop_split_sums_to_total(
        taxable in amount_strategy(),
        rate in gst_rate_strategy(),
        jurisdiction in jurisdiction_strategy(),
    ) {
        let total = compute_total_tax(taxable, rate);
        let split = TaxSplit::split(total, jurisdiction);
        prop_assert_eq!(split.total(), total);
    }

    /// Intra-state supplies split evenly and carry no IGST.
    #[test]
    fn prop_intra_state_splits_evenly(
        taxable in amount_strategy(),
        rate in gst_rate_strategy(),
    ) {
        let total = compute_total_tax(taxable, rate);
        let split = TaxSplit::split(total, Jurisdiction::IntraState);
        prop_assert_eq!(split.cgst, split.sgst);
        prop_assert_eq!(split.igst, Decimal::ZERO);
    }

    /// Inter-state supplies carry the whole tax as IGST.
    #[test]
    fn prop_inter_state_is_all_igst(
        taxable in amount_strategy(),
        rate in gst_rate_strategy(),
    ) {
        let total = compute_total_tax(taxable, rate);
        let split = TaxSplit::split(total, Jurisdiction::InterState);
        prop_assert_eq!(split.igst, total);
        prop_assert_eq!(split.cgst, Decimal::ZERO);
        prop_assert_eq!(split.sgst, Decimal::ZERO);
    }

    /// Taxable value scales linearly with quantity.
    #[test]
    fn prop_taxable_value_linear_in_quantity(
        quantity in 1i64..10_000,
        rate in amount_strategy(),
    ) {
        let single = taxable_value(1, rate);
        let many = taxable_value(quantity, rate);
        prop_assert_eq!(many, single * Decimal::from(quantity));
    }

    /// Tax is never negative for non-negative inputs.
    #[test]
    fn prop_tax_non_negative(
        taxable in amount_strategy(),
        rate in gst_rate_strategy(),
    ) {
        prop_assert!(compute_total_tax(taxable, rate) >= Decimal::ZERO);
    }
}
