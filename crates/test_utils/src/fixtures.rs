//! Pre-built test fixtures
//!
//! Ready-to-use test data, consistent and predictable across the suite.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{CustomerId, Money, OwnerId, ProductId, TaxRate};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A standard round amount
    pub fn hundred() -> Money {
        Money::new(dec!(100.00))
    }

    /// A typical retail price
    pub fn retail_price() -> Money {
        Money::new(dec!(9.99))
    }

    /// An amount that exercises half-up rounding when taxed
    pub fn rounding_probe() -> Money {
        Money::new(dec!(33.33))
    }

    /// The zero amount
    pub fn zero() -> Money {
        Money::zero()
    }

    /// A standard sales-tax rate
    pub fn standard_tax() -> TaxRate {
        TaxRate::new(dec!(18)).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    pub fn owner_id() -> OwnerId {
        OwnerId::new_v7()
    }

    pub fn product_id() -> ProductId {
        ProductId::new_v7()
    }

    pub fn customer_id() -> CustomerId {
        CustomerId::new_v7()
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    pub fn sku() -> &'static str {
        "WID-001"
    }

    pub fn product_name() -> &'static str {
        "Blue Widget"
    }

    pub fn customer_name() -> &'static str {
        "Acme Traders"
    }

    pub fn invoice_number() -> &'static str {
        "INV-20240307-001"
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A fixed, known transaction timestamp (Mar 7, 2024)
    pub fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 10, 30, 0).unwrap()
    }

    /// A timestamp on the following day
    pub fn next_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 8, 10, 30, 0).unwrap()
    }
}
