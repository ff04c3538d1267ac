//! Database row representations and their domain conversions
//!
//! Row structs mirror the table columns one to one; conversion into domain
//! types re-validates what the database cannot express (tax-rate range,
//! snapshot JSON shape) and reports failures as serialization errors.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use core_kernel::{CustomerId, InvoiceId, Money, OwnerId, ProductId, TaxRate};
use domain_billing::{Discount, DiscountKind, Invoice, ItemSnapshot};
use domain_catalog::{Customer, CustomerSnapshot, Product};

use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub(crate) struct ProductRow {
    pub product_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
    pub stock: i64,
    pub low_stock_threshold: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    pub fn into_domain(self) -> Result<Product, DatabaseError> {
        Ok(Product {
            id: ProductId::from_uuid(self.product_id),
            owner_id: OwnerId::from_uuid(self.owner_id),
            name: self.name,
            sku: self.sku,
            unit_price: Money::new(self.unit_price),
            tax_rate: TaxRate::new(self.tax_rate)
                .map_err(|e| DatabaseError::SerializationError(e.to_string()))?,
            stock: self.stock,
            low_stock_threshold: self.low_stock_threshold,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CustomerRow {
    pub customer_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerRow {
    pub fn into_domain(self) -> Customer {
        Customer {
            id: CustomerId::from_uuid(self.customer_id),
            owner_id: OwnerId::from_uuid(self.owner_id),
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            tax_id: self.tax_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct InvoiceRow {
    pub invoice_id: Uuid,
    pub owner_id: Uuid,
    pub invoice_number: String,
    pub customer_id: Option<Uuid>,
    pub customer_snapshot: Option<serde_json::Value>,
    pub items: serde_json::Value,
    pub discount_kind: String,
    pub discount_value: Decimal,
    pub payment_method: String,
    pub total_amount: Decimal,
    pub issued_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl InvoiceRow {
    pub fn into_domain(self) -> Result<Invoice, DatabaseError> {
        let items: Vec<ItemSnapshot> = serde_json::from_value(self.items)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
        let customer_snapshot: Option<CustomerSnapshot> = self
            .customer_snapshot
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        Ok(Invoice {
            id: InvoiceId::from_uuid(self.invoice_id),
            owner_id: OwnerId::from_uuid(self.owner_id),
            invoice_number: self.invoice_number,
            customer_id: self.customer_id.map(CustomerId::from_uuid),
            customer_snapshot,
            items,
            discount: Discount {
                kind: parse_discount_kind(&self.discount_kind)?,
                value: self.discount_value,
            },
            payment_method: self.payment_method,
            total_amount: Money::new(self.total_amount),
            issued_at: self.issued_at,
            created_at: self.created_at,
        })
    }
}

pub(crate) fn discount_kind_str(kind: DiscountKind) -> &'static str {
    match kind {
        DiscountKind::Flat => "flat",
        DiscountKind::Percentage => "percentage",
    }
}

fn parse_discount_kind(raw: &str) -> Result<DiscountKind, DatabaseError> {
    match raw {
        "flat" => Ok(DiscountKind::Flat),
        "percentage" => Ok(DiscountKind::Percentage),
        other => Err(DatabaseError::SerializationError(format!(
            "unknown discount kind '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_row_round_trip() {
        let now = Utc::now();
        let row = ProductRow {
            product_id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            name: "Widget".to_string(),
            sku: "WID-001".to_string(),
            unit_price: dec!(12.34),
            tax_rate: dec!(18),
            stock: 9,
            low_stock_threshold: 10,
            created_at: now,
            updated_at: now,
        };

        let product = row.into_domain().unwrap();
        assert_eq!(product.unit_price, Money::new(dec!(12.34)));
        assert_eq!(product.tax_rate.percent(), dec!(18));
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_out_of_range_tax_rate_is_a_serialization_error() {
        let now = Utc::now();
        let row = ProductRow {
            product_id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            name: "Widget".to_string(),
            sku: "WID-001".to_string(),
            unit_price: dec!(1),
            tax_rate: dec!(250),
            stock: 0,
            low_stock_threshold: 10,
            created_at: now,
            updated_at: now,
        };

        assert!(matches!(
            row.into_domain(),
            Err(DatabaseError::SerializationError(_))
        ));
    }

    #[test]
    fn test_invoice_row_decodes_snapshots() {
        let now = Utc::now();
        let items = serde_json::json!([{
            "product_id": Uuid::now_v7(),
            "name": "Widget",
            "sku": "WID-001",
            "unit_price": "100.00",
            "tax_rate": "18",
            "quantity": 2,
            "subtotal": "200.00",
            "tax_amount": "36.00",
            "line_total": "236.00"
        }]);

        let row = InvoiceRow {
            invoice_id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            invoice_number: "INV-20240307-001".to_string(),
            customer_id: None,
            customer_snapshot: None,
            items,
            discount_kind: "flat".to_string(),
            discount_value: dec!(36),
            payment_method: "Cash".to_string(),
            total_amount: dec!(200),
            issued_at: now,
            created_at: now,
        };

        let invoice = row.into_domain().unwrap();
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].quantity, 2);
        assert_eq!(invoice.total_amount, Money::new(dec!(200)));
    }

    #[test]
    fn test_unknown_discount_kind_rejected() {
        let now = Utc::now();
        let row = InvoiceRow {
            invoice_id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            invoice_number: "INV-1".to_string(),
            customer_id: None,
            customer_snapshot: None,
            items: serde_json::json!([]),
            discount_kind: "bogus".to_string(),
            discount_value: dec!(0),
            payment_method: "Cash".to_string(),
            total_amount: dec!(0),
            issued_at: now,
            created_at: now,
        };

        assert!(matches!(
            row.into_domain(),
            Err(DatabaseError::SerializationError(_))
        ));
    }
}
