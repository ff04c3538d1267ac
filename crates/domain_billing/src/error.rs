//! Billing error taxonomy
//!
//! Three caller-facing classes plus the transient storage class:
//! validation failures, business-rule conflicts (which carry the
//! conflicting values so the caller can retry intelligently), and
//! not-found on void. Every failure aborts the whole transaction - no
//! error is handled by partially applying an operation.

use thiserror::Error;

use core_kernel::{CustomerId, ProductId};

use crate::ports::StoreError;
use crate::pricing::PricingError;

/// Errors produced by the billing coordinators
#[derive(Debug, Error)]
pub enum BillingError {
    /// The request carried no line items
    #[error("Invoice must contain at least one line item")]
    EmptyInvoice,

    /// A line referenced a product that does not exist for this owner
    #[error("Product {product_id} not found")]
    ProductNotFound { product_id: ProductId },

    /// A line requested a zero quantity
    #[error("Invalid quantity for product {product_id}")]
    InvalidQuantity { product_id: ProductId },

    /// A line requested more units than are on hand
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: u32,
    },

    /// The referenced customer does not exist for this owner
    #[error("Customer {customer_id} not found")]
    CustomerNotFound { customer_id: CustomerId },

    /// The discount descriptor was invalid
    #[error("Invalid discount: {0}")]
    InvalidDiscount(String),

    /// The resolved invoice number already exists for this owner
    #[error("Invoice number {0} already exists")]
    DuplicateInvoiceNumber(String),

    /// No invoice matched the given id or number for this owner
    #[error("Invoice {0} not found")]
    InvoiceNotFound(String),

    /// Storage-level failure; the only retryable class
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BillingError {
    /// True when the caller may retry the operation unchanged
    ///
    /// Only transient storage failures qualify; every other variant is a
    /// caller error and will fail again identically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BillingError::Store(err) if err.is_transient())
    }

    /// True for failures caused by the request contents
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BillingError::EmptyInvoice
                | BillingError::ProductNotFound { .. }
                | BillingError::InvalidQuantity { .. }
                | BillingError::CustomerNotFound { .. }
                | BillingError::InvalidDiscount(_)
        )
    }

    /// True for business-rule conflicts that carry the conflicting values
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            BillingError::InsufficientStock { .. } | BillingError::DuplicateInvoiceNumber(_)
        )
    }
}

impl From<PricingError> for BillingError {
    fn from(err: PricingError) -> Self {
        BillingError::InvalidDiscount(err.to_string())
    }
}
