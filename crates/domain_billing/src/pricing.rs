//! Pricing engine
//!
//! Pure computation over line items and a discount descriptor. No I/O, no
//! hidden state: identical input always yields identical output. Every
//! intermediate value (subtotal, tax, line total, final total) is rounded
//! half-up to two decimal places through `Money`, so totals are
//! reproducible regardless of evaluation order.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{Money, TaxRate};

/// Errors produced by discount validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Percentage discount must be between 0 and 100, got {0}")]
    PercentageOutOfRange(Decimal),

    #[error("Flat discount {discount} exceeds gross total {gross}")]
    FlatExceedsGross { discount: Money, gross: Money },

    #[error("Discount value must not be negative, got {0}")]
    NegativeDiscount(Decimal),
}

/// How a discount value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// Absolute currency deduction from the gross total
    Flat,
    /// Proportional deduction from the gross total
    Percentage,
}

/// A discount applied to an invoice's gross total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub kind: DiscountKind,
    pub value: Decimal,
}

impl Discount {
    /// No discount
    pub fn none() -> Self {
        Self {
            kind: DiscountKind::Flat,
            value: dec!(0),
        }
    }

    /// A flat currency deduction
    pub fn flat(value: Decimal) -> Self {
        Self {
            kind: DiscountKind::Flat,
            value,
        }
    }

    /// A percentage deduction
    pub fn percentage(value: Decimal) -> Self {
        Self {
            kind: DiscountKind::Percentage,
            value,
        }
    }

    /// Returns true if this discount has no effect
    pub fn is_none(&self) -> bool {
        self.value.is_zero()
    }
}

impl Default for Discount {
    fn default() -> Self {
        Self::none()
    }
}

/// One line of pricing input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInput {
    pub unit_price: Money,
    pub tax_rate: TaxRate,
    pub quantity: u32,
}

/// The priced form of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    /// `unit_price * quantity`, rounded
    pub subtotal: Money,
    /// `subtotal * tax_rate`, rounded
    pub tax_amount: Money,
    /// `subtotal + tax_amount`
    pub line_total: Money,
}

/// Full pricing result for an invoice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// Per-line results, in input order
    pub lines: Vec<PricedLine>,
    /// Sum of all line totals before discount
    pub gross_total: Money,
    /// Payable amount after discount, clamped at zero
    pub final_total: Money,
}

/// Prices an ordered set of lines and applies the discount
///
/// # Errors
///
/// Returns `PricingError` if the discount descriptor is invalid: a
/// percentage outside `[0, 100]`, a flat value exceeding the gross total,
/// or a negative value of either kind.
pub fn price(lines: &[LineInput], discount: &Discount) -> Result<PriceBreakdown, PricingError> {
    let priced: Vec<PricedLine> = lines
        .iter()
        .map(|line| {
            let subtotal = line.unit_price.times(line.quantity);
            let tax_amount = line.tax_rate.apply(&subtotal);
            let line_total = subtotal + tax_amount;
            PricedLine {
                subtotal,
                tax_amount,
                line_total,
            }
        })
        .collect();

    let gross_total: Money = priced.iter().map(|l| l.line_total).sum();
    let final_total = apply_discount(gross_total, discount)?.clamp_non_negative();

    Ok(PriceBreakdown {
        lines: priced,
        gross_total,
        final_total,
    })
}

fn apply_discount(gross: Money, discount: &Discount) -> Result<Money, PricingError> {
    if discount.value.is_sign_negative() && !discount.value.is_zero() {
        return Err(PricingError::NegativeDiscount(discount.value));
    }
    if discount.value.is_zero() {
        return Ok(gross);
    }

    match discount.kind {
        DiscountKind::Percentage => {
            if discount.value > dec!(100) {
                return Err(PricingError::PercentageOutOfRange(discount.value));
            }
            Ok(gross.multiply(dec!(1) - discount.value / dec!(100)))
        }
        DiscountKind::Flat => {
            let amount = Money::new(discount.value);
            if amount > gross {
                return Err(PricingError::FlatExceedsGross {
                    discount: amount,
                    gross,
                });
            }
            Ok(gross - amount)
        }
    }
}
