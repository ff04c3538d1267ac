//! Test Utilities
//!
//! Shared fixtures, builders, and assertions for the billing test suite.
//! Builders produce internally consistent domain values - an invoice built
//! here always carries totals the pricing engine actually computed.

pub mod fixtures;
pub mod builders;
pub mod assertions;

pub use fixtures::{IdFixtures, MoneyFixtures, StringFixtures, TemporalFixtures};
pub use builders::{CustomerBuilder, InvoiceBuilder, ProductBuilder};
pub use assertions::{assert_invoice_totals_consistent, assert_money_eq};
