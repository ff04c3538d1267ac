//! Invoice document model
//!
//! An invoice is a ledger entry: once written it is never edited in place.
//! Each line is persisted as an `ItemSnapshot` capturing the product's
//! price, tax rate, name, and SKU at the moment of sale, so later product
//! edits cannot rewrite history. A correction is modeled as void + recreate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use core_kernel::{CustomerId, InvoiceId, Money, OwnerId, ProductId, TaxRate};
use domain_catalog::CustomerSnapshot;

use crate::pricing::Discount;

/// Payment method applied when the request does not name one
pub const DEFAULT_PAYMENT_METHOD: &str = "Cash";

/// One product + quantity request within an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A line of an invoice, frozen at the moment of sale
///
/// All monetary fields are captured from the locked product row and the
/// pricing engine; they stay valid even if the product record later
/// changes or disappears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub sku: String,
    pub unit_price: Money,
    pub tax_rate: TaxRate,
    pub quantity: u32,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub line_total: Money,
}

/// The persisted invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Owning account
    pub owner_id: OwnerId,
    /// Human-meaningful number, unique per owner
    pub invoice_number: String,
    /// Optional reference to the live customer row
    pub customer_id: Option<CustomerId>,
    /// Frozen customer display fields, owned by this invoice
    pub customer_snapshot: Option<CustomerSnapshot>,
    /// Line snapshots in entry order
    pub items: Vec<ItemSnapshot>,
    /// Discount applied to the gross total
    pub discount: Discount,
    /// Free-form payment method tag
    pub payment_method: String,
    /// Payable amount; always the pricing engine's output for the stored
    /// items and discount
    pub total_amount: Money,
    /// Transaction timestamp
    pub issued_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Request to create an invoice
///
/// Quantities are unsigned integers, so negative or fractional values are
/// unrepresentable; zero is rejected by the coordinator. There are
/// deliberately no per-item price or tax fields - snapshots always derive
/// from the locked product row.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    /// Caller-supplied number; generated when absent
    pub invoice_number: Option<String>,
    /// Optional customer reference, verified against the owner
    pub customer_id: Option<CustomerId>,
    /// Ordered line items; must be non-empty
    pub items: Vec<LineItem>,
    /// Discount descriptor
    pub discount: Discount,
    /// Payment method tag
    pub payment_method: String,
    /// Transaction timestamp; defaults to now
    pub issued_at: Option<DateTime<Utc>>,
}

impl CreateInvoice {
    /// Creates a request with the given line items and defaults elsewhere
    pub fn new(items: Vec<LineItem>) -> Self {
        Self {
            invoice_number: None,
            customer_id: None,
            items,
            discount: Discount::none(),
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            issued_at: None,
        }
    }

    /// Supplies an explicit invoice number
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = Some(number.into());
        self
    }

    /// References a customer
    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Applies a discount
    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = discount;
        self
    }

    /// Sets the payment method tag
    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }

    /// Sets the transaction timestamp
    pub fn dated(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = Some(issued_at);
        self
    }
}

/// Reference to a stored invoice, by id or by number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceRef {
    Id(InvoiceId),
    Number(String),
}

impl InvoiceRef {
    /// Interprets a path segment as an id when it parses as a UUID,
    /// otherwise as an invoice number
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(uuid) => InvoiceRef::Id(InvoiceId::from_uuid(uuid)),
            Err(_) => InvoiceRef::Number(raw.to_string()),
        }
    }
}

impl fmt::Display for InvoiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceRef::Id(id) => write!(f, "{}", id),
            InvoiceRef::Number(number) => write!(f, "{}", number),
        }
    }
}

impl From<InvoiceId> for InvoiceRef {
    fn from(id: InvoiceId) -> Self {
        InvoiceRef::Id(id)
    }
}

impl FromStr for InvoiceRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Formats a generated invoice number: `INV-<YYYYMMDD>-<seq>`
///
/// The sequence is per owner per day and zero-padded to three digits.
pub fn invoice_number_for(date: NaiveDate, sequence: u32) -> String {
    format!("INV-{}-{:03}", date.format("%Y%m%d"), sequence)
}
