//! Catalog domain errors

use core_kernel::Money;
use thiserror::Error;

/// Errors that can occur when constructing catalog entities
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required text field was empty
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// Unit price below zero
    #[error("Unit price must not be negative, got {0}")]
    NegativePrice(Money),

    /// Initial stock below zero
    #[error("Stock must not be negative, got {0}")]
    NegativeStock(i64),
}
