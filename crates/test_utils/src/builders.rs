//! Test data builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and rely on defaults elsewhere.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use core_kernel::{CustomerId, InvoiceId, Money, OwnerId, TaxRate};
use domain_billing::pricing::{self, LineInput};
use domain_billing::{Discount, Invoice, ItemSnapshot};
use domain_catalog::{Customer, CustomerSnapshot, Product};

use crate::fixtures::{MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for test products
pub struct ProductBuilder {
    owner_id: OwnerId,
    name: String,
    sku: String,
    unit_price: Money,
    tax_rate: TaxRate,
    stock: i64,
    low_stock_threshold: Option<i64>,
}

impl Default for ProductBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductBuilder {
    /// Creates a builder with default values
    pub fn new() -> Self {
        Self {
            owner_id: OwnerId::new_v7(),
            name: StringFixtures::product_name().to_string(),
            sku: StringFixtures::sku().to_string(),
            unit_price: MoneyFixtures::hundred(),
            tax_rate: MoneyFixtures::standard_tax(),
            stock: 10,
            low_stock_threshold: None,
        }
    }

    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = sku.into();
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.unit_price = Money::new(price);
        self
    }

    pub fn with_tax_rate(mut self, percent: Decimal) -> Self {
        self.tax_rate = TaxRate::new(percent).expect("valid tax rate in test builder");
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = Some(threshold);
        self
    }

    /// Builds the product
    pub fn build(self) -> Product {
        let mut product = Product::new(
            self.owner_id,
            self.name,
            self.sku,
            self.unit_price,
            self.tax_rate,
            self.stock,
        )
        .expect("valid product in test builder");
        if let Some(threshold) = self.low_stock_threshold {
            product = product.with_low_stock_threshold(threshold);
        }
        product
    }
}

/// Builder for test customers
pub struct CustomerBuilder {
    owner_id: OwnerId,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    tax_id: Option<String>,
}

impl Default for CustomerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerBuilder {
    /// Creates a builder with default values
    pub fn new() -> Self {
        Self {
            owner_id: OwnerId::new_v7(),
            name: StringFixtures::customer_name().to_string(),
            email: None,
            phone: None,
            address: None,
            tax_id: None,
        }
    }

    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    /// Builds the customer
    pub fn build(self) -> Customer {
        let mut customer =
            Customer::new(self.owner_id, self.name).expect("valid customer in test builder");
        customer.email = self.email;
        customer.phone = self.phone;
        customer.address = self.address;
        customer.tax_id = self.tax_id;
        customer
    }
}

/// Builder for fully-formed test invoices
///
/// Runs the pricing engine over the configured lines, so the built
/// invoice's snapshots and total are internally consistent.
pub struct InvoiceBuilder {
    owner_id: OwnerId,
    invoice_number: String,
    customer: Option<Customer>,
    lines: Vec<(Product, u32)>,
    discount: Discount,
    payment_method: String,
    issued_at: DateTime<Utc>,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    /// Creates a builder with default values and no lines
    pub fn new() -> Self {
        Self {
            owner_id: OwnerId::new_v7(),
            invoice_number: StringFixtures::invoice_number().to_string(),
            customer: None,
            lines: Vec::new(),
            discount: Discount::none(),
            payment_method: "Cash".to_string(),
            issued_at: TemporalFixtures::issued_at(),
        }
    }

    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = number.into();
        self
    }

    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Adds a product/quantity line
    pub fn with_line(mut self, product: Product, quantity: u32) -> Self {
        self.lines.push((product, quantity));
        self
    }

    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }

    pub fn issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Builds the invoice, pricing the configured lines
    pub fn build(self) -> Invoice {
        let inputs: Vec<LineInput> = self
            .lines
            .iter()
            .map(|(product, quantity)| LineInput {
                unit_price: product.unit_price,
                tax_rate: product.tax_rate,
                quantity: *quantity,
            })
            .collect();
        let breakdown =
            pricing::price(&inputs, &self.discount).expect("valid pricing in test builder");

        let items: Vec<ItemSnapshot> = self
            .lines
            .into_iter()
            .zip(breakdown.lines.iter())
            .map(|((product, quantity), priced)| ItemSnapshot {
                product_id: product.id,
                name: product.name,
                sku: product.sku,
                unit_price: product.unit_price,
                tax_rate: product.tax_rate,
                quantity,
                subtotal: priced.subtotal,
                tax_amount: priced.tax_amount,
                line_total: priced.line_total,
            })
            .collect();

        let (customer_id, customer_snapshot): (Option<CustomerId>, _) = match &self.customer {
            Some(customer) => (Some(customer.id), Some(CustomerSnapshot::from(customer))),
            None => (None, None),
        };

        Invoice {
            id: InvoiceId::new_v7(),
            owner_id: self.owner_id,
            invoice_number: self.invoice_number,
            customer_id,
            customer_snapshot,
            items,
            discount: self.discount,
            payment_method: self.payment_method,
            total_amount: breakdown.final_total,
            issued_at: self.issued_at,
            created_at: self.issued_at,
        }
    }
}
