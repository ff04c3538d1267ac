//! Custom test assertions

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_billing::pricing::{self, LineInput};
use domain_billing::Invoice;

/// Asserts a money value equals the expected decimal amount
///
/// # Panics
///
/// Panics with both values when they differ.
pub fn assert_money_eq(actual: Money, expected: Decimal) {
    assert_eq!(
        actual,
        Money::new(expected),
        "expected {} to equal {}",
        actual,
        expected
    );
}

/// Asserts an invoice's totals are exactly what the pricing engine
/// produces for its stored items and discount
///
/// This is the ledger invariant: `total_amount` is never independently
/// editable.
///
/// # Panics
///
/// Panics if any snapshot amount or the final total diverges from a
/// recomputation.
pub fn assert_invoice_totals_consistent(invoice: &Invoice) {
    let inputs: Vec<LineInput> = invoice
        .items
        .iter()
        .map(|item| LineInput {
            unit_price: item.unit_price,
            tax_rate: item.tax_rate,
            quantity: item.quantity,
        })
        .collect();

    let breakdown = pricing::price(&inputs, &invoice.discount)
        .expect("stored invoice must carry a valid discount");

    for (item, priced) in invoice.items.iter().zip(breakdown.lines.iter()) {
        assert_eq!(
            item.subtotal, priced.subtotal,
            "subtotal mismatch for {}",
            item.sku
        );
        assert_eq!(
            item.tax_amount, priced.tax_amount,
            "tax mismatch for {}",
            item.sku
        );
        assert_eq!(
            item.line_total, priced.line_total,
            "line total mismatch for {}",
            item.sku
        );
    }

    assert_eq!(
        invoice.total_amount, breakdown.final_total,
        "invoice total diverges from pricing engine output"
    );
}
