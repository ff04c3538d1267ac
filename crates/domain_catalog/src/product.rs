//! Product entity
//!
//! A product belongs to exactly one owner, carries its current unit price
//! and tax rate, and holds the live stock counter the billing transaction
//! locks and decrements. SKUs are unique per owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, OwnerId, ProductId, TaxRate};

use crate::error::CatalogError;

/// Default low-stock threshold applied when none is supplied
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// A sellable product with a live stock counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Owning account
    pub owner_id: OwnerId,
    /// Display name
    pub name: String,
    /// Stock-keeping unit, unique per owner
    pub sku: String,
    /// Current unit price
    pub unit_price: Money,
    /// Tax rate applied at sale time
    pub tax_rate: TaxRate,
    /// Units on hand; never negative
    pub stock: i64,
    /// Threshold below which the product counts as low on stock
    pub low_stock_threshold: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new product after validating its fields
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the name or SKU is empty, the price is
    /// negative, or the initial stock is negative.
    pub fn new(
        owner_id: OwnerId,
        name: impl Into<String>,
        sku: impl Into<String>,
        unit_price: Money,
        tax_rate: TaxRate,
        stock: i64,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        let sku = sku.into();

        if name.trim().is_empty() {
            return Err(CatalogError::EmptyField("name"));
        }
        if sku.trim().is_empty() {
            return Err(CatalogError::EmptyField("sku"));
        }
        if unit_price.is_negative() {
            return Err(CatalogError::NegativePrice(unit_price));
        }
        if stock < 0 {
            return Err(CatalogError::NegativeStock(stock));
        }

        let now = Utc::now();
        Ok(Self {
            id: ProductId::new_v7(),
            owner_id,
            name,
            sku,
            unit_price,
            tax_rate,
            stock,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sets a custom low-stock threshold
    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    /// Returns true if stock is at or below the low-stock threshold
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }

    /// Returns true if the requested quantity can be fulfilled
    pub fn has_stock(&self, quantity: u32) -> bool {
        self.stock >= i64::from(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_product(stock: i64) -> Product {
        Product::new(
            OwnerId::new(),
            "Blue Widget",
            "WID-001",
            Money::new(dec!(9.99)),
            TaxRate::new(dec!(18)).unwrap(),
            stock,
        )
        .unwrap()
    }

    #[test]
    fn test_new_product_defaults() {
        let product = sample_product(25);
        assert_eq!(product.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_rejects_empty_sku() {
        let result = Product::new(
            OwnerId::new(),
            "Widget",
            "  ",
            Money::zero(),
            TaxRate::zero(),
            0,
        );
        assert!(matches!(result, Err(CatalogError::EmptyField("sku"))));
    }

    #[test]
    fn test_rejects_negative_price() {
        let result = Product::new(
            OwnerId::new(),
            "Widget",
            "WID-001",
            Money::new(dec!(-1)),
            TaxRate::zero(),
            0,
        );
        assert!(matches!(result, Err(CatalogError::NegativePrice(_))));
    }

    #[test]
    fn test_rejects_negative_stock() {
        let result = Product::new(
            OwnerId::new(),
            "Widget",
            "WID-001",
            Money::zero(),
            TaxRate::zero(),
            -4,
        );
        assert!(matches!(result, Err(CatalogError::NegativeStock(-4))));
    }

    #[test]
    fn test_low_stock_boundary() {
        let product = sample_product(10);
        assert!(product.is_low_stock());

        let product = sample_product(11);
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_has_stock() {
        let product = sample_product(5);
        assert!(product.has_stock(5));
        assert!(!product.has_stock(6));
    }
}
