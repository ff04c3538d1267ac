//! Pricing engine tests
//!
//! Covers the arithmetic contract (per-step rounding, discount rules,
//! clamping) and the determinism guarantee.

use core_kernel::{Money, TaxRate};
use domain_billing::pricing::{price, LineInput, PricingError};
use domain_billing::Discount;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn line(unit_price: Decimal, tax_percent: Decimal, quantity: u32) -> LineInput {
    LineInput {
        unit_price: Money::new(unit_price),
        tax_rate: TaxRate::new(tax_percent).unwrap(),
        quantity,
    }
}

#[test]
fn multi_line_totals_sum() {
    let breakdown = price(
        &[
            line(dec!(100), dec!(18), 2), // 236.00
            line(dec!(9.99), dec!(0), 3), // 29.97
            line(dec!(0.50), dec!(5), 1), // 0.53
        ],
        &Discount::none(),
    )
    .unwrap();

    assert_eq!(breakdown.gross_total.amount(), dec!(266.50));
    assert_eq!(breakdown.final_total.amount(), dec!(266.50));
}

#[test]
fn tax_rounds_half_up_per_line() {
    // 0.50 * 5% = 0.025 -> 0.03 under half-up rounding
    let breakdown = price(&[line(dec!(0.50), dec!(5), 1)], &Discount::none()).unwrap();
    assert_eq!(breakdown.lines[0].tax_amount.amount(), dec!(0.03));
}

#[test]
fn flat_discount_equal_to_gross_is_allowed() {
    let breakdown = price(&[line(dec!(25), dec!(0), 2)], &Discount::flat(dec!(50))).unwrap();
    assert!(breakdown.final_total.is_zero());
}

#[test]
fn percentage_boundaries() {
    let lines = [line(dec!(80), dec!(0), 1)];

    let zero = price(&lines, &Discount::percentage(dec!(0))).unwrap();
    assert_eq!(zero.final_total.amount(), dec!(80));

    let hundred = price(&lines, &Discount::percentage(dec!(100))).unwrap();
    assert!(hundred.final_total.is_zero());

    let over = price(&lines, &Discount::percentage(dec!(100.01)));
    assert!(matches!(over, Err(PricingError::PercentageOutOfRange(_))));
}

#[test]
fn empty_line_set_prices_to_zero() {
    let breakdown = price(&[], &Discount::none()).unwrap();
    assert!(breakdown.lines.is_empty());
    assert!(breakdown.gross_total.is_zero());
    assert!(breakdown.final_total.is_zero());
}

#[test]
fn identical_input_yields_identical_output() {
    let lines = [
        line(dec!(33.33), dec!(18), 3),
        line(dec!(7.77), dec!(12.5), 7),
    ];
    let discount = Discount::percentage(dec!(7.5));

    let first = price(&lines, &discount).unwrap();
    let second = price(&lines, &discount).unwrap();

    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn pricing_is_deterministic(
        prices in proptest::collection::vec(1i64..1_000_000i64, 1..8),
        quantities in proptest::collection::vec(1u32..1000u32, 1..8),
        tax in 0u32..=100u32,
        discount_percent in 0u32..=100u32
    ) {
        let lines: Vec<LineInput> = prices
            .iter()
            .zip(quantities.iter().cycle())
            .map(|(minor, qty)| LineInput {
                unit_price: Money::from_minor(*minor),
                tax_rate: TaxRate::new(Decimal::from(tax)).unwrap(),
                quantity: *qty,
            })
            .collect();
        let discount = Discount::percentage(Decimal::from(discount_percent));

        let first = price(&lines, &discount).unwrap();
        let second = price(&lines, &discount).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn final_total_never_negative_or_above_gross(
        prices in proptest::collection::vec(1i64..1_000_000i64, 1..8),
        tax in 0u32..=100u32,
        discount_percent in 0u32..=100u32
    ) {
        let lines: Vec<LineInput> = prices
            .iter()
            .map(|minor| LineInput {
                unit_price: Money::from_minor(*minor),
                tax_rate: TaxRate::new(Decimal::from(tax)).unwrap(),
                quantity: 1,
            })
            .collect();

        let breakdown = price(&lines, &Discount::percentage(Decimal::from(discount_percent))).unwrap();
        prop_assert!(!breakdown.final_total.is_negative());
        prop_assert!(breakdown.final_total <= breakdown.gross_total);
    }

    #[test]
    fn gross_total_is_sum_of_line_totals(
        prices in proptest::collection::vec(1i64..1_000_000i64, 1..8),
        tax in 0u32..=100u32
    ) {
        let lines: Vec<LineInput> = prices
            .iter()
            .map(|minor| LineInput {
                unit_price: Money::from_minor(*minor),
                tax_rate: TaxRate::new(Decimal::from(tax)).unwrap(),
                quantity: 2,
            })
            .collect();

        let breakdown = price(&lines, &Discount::none()).unwrap();
        let summed: Money = breakdown.lines.iter().map(|l| l.line_total).sum();
        prop_assert_eq!(breakdown.gross_total, summed);
    }
}
