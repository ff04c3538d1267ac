//! Billing DTOs
//!
//! The create request is a strongly-typed model of the inbound body:
//! explicit optional fields, unsigned quantities, and deliberately no
//! per-item price or tax overrides - snapshots always derive from the
//! stored product rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{CustomerId, ProductId};
use domain_billing::{CreateInvoice, Discount, DiscountKind, Invoice, ItemSnapshot, LineItem};
use domain_catalog::CustomerSnapshot;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub invoice_number: Option<String>,
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, message = "at least one line item is required"), nested)]
    pub items: Vec<LineItemRequest>,
    pub discount: Option<DiscountRequest>,
    pub payment_method: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LineItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be a positive integer"))]
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DiscountRequest {
    pub kind: DiscountKind,
    pub value: Decimal,
}

impl CreateInvoiceRequest {
    /// Converts the validated request into the domain form
    pub fn into_domain(self) -> CreateInvoice {
        let items = self
            .items
            .into_iter()
            .map(|item| LineItem::new(ProductId::from_uuid(item.product_id), item.quantity))
            .collect();

        let mut request = CreateInvoice::new(items);
        if let Some(number) = self.invoice_number {
            request = request.with_number(number);
        }
        if let Some(customer_id) = self.customer_id {
            request = request.with_customer(CustomerId::from_uuid(customer_id));
        }
        if let Some(discount) = self.discount {
            request = request.with_discount(Discount {
                kind: discount.kind,
                value: discount.value,
            });
        }
        if let Some(method) = self.payment_method {
            request = request.with_payment_method(method);
        }
        if let Some(date) = self.date {
            request = request.dated(date);
        }
        request
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_id: Option<Uuid>,
    pub customer_snapshot: Option<CustomerSnapshot>,
    pub items: Vec<ItemSnapshotResponse>,
    pub discount: DiscountResponse,
    pub payment_method: String,
    pub total_amount: Decimal,
    pub issued_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ItemSnapshotResponse {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DiscountResponse {
    pub kind: DiscountKind,
    pub value: Decimal,
}

#[derive(Debug, Serialize)]
pub struct VoidResponse {
    pub success: bool,
    pub invoice_number: String,
    /// Products that no longer existed; their stock was not restored
    pub skipped_products: Vec<Uuid>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: (*invoice.id.as_uuid()),
            invoice_number: invoice.invoice_number,
            customer_id: invoice.customer_id.map(Uuid::from),
            customer_snapshot: invoice.customer_snapshot,
            items: invoice.items.into_iter().map(Into::into).collect(),
            discount: DiscountResponse {
                kind: invoice.discount.kind,
                value: invoice.discount.value,
            },
            payment_method: invoice.payment_method,
            total_amount: invoice.total_amount.amount(),
            issued_at: invoice.issued_at,
            created_at: invoice.created_at,
        }
    }
}

impl From<ItemSnapshot> for ItemSnapshotResponse {
    fn from(item: ItemSnapshot) -> Self {
        Self {
            product_id: (*item.product_id.as_uuid()),
            name: item.name,
            sku: item.sku,
            unit_price: item.unit_price.amount(),
            tax_rate: item.tax_rate.percent(),
            quantity: item.quantity,
            subtotal: item.subtotal.amount(),
            tax_amount: item.tax_amount.amount(),
            line_total: item.line_total.amount(),
        }
    }
}
