//! Billing Domain - Invoice Transactions
//!
//! This crate implements the billing core: a pure pricing engine, the
//! invoice document model with its immutable line-item snapshots, and the
//! two transaction coordinators that create and void invoices atomically
//! against a storage port.
//!
//! # Transaction Model
//!
//! Invoice creation validates a multi-line order against live inventory,
//! locks and decrements stock, computes tax- and discount-correct totals,
//! and persists a frozen snapshot of every line - all inside one storage
//! transaction. Voiding reverses the stock effects and removes the invoice
//! under the same all-or-nothing rule. Stock can never be observed
//! negative: concurrent creators serialize on per-product row locks taken
//! by the storage layer, never on in-process state.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{CreateInvoice, Discount, InvoiceCoordinator, LineItem};
//!
//! let coordinator = InvoiceCoordinator::new(store);
//! let invoice = coordinator
//!     .create_invoice(owner, CreateInvoice::new(vec![LineItem::new(product_id, 2)])
//!         .with_discount(Discount::flat(dec!(36))))
//!     .await?;
//! ```

pub mod pricing;
pub mod invoice;
pub mod ports;
pub mod coordinator;
pub mod void;
pub mod error;

pub use pricing::{Discount, DiscountKind, LineInput, PriceBreakdown, PricedLine, PricingError};
pub use invoice::{CreateInvoice, Invoice, InvoiceRef, ItemSnapshot, LineItem};
pub use ports::{BillingStore, BillingTxn, NewStockMovement, StoreError};
pub use coordinator::InvoiceCoordinator;
pub use void::{VoidCoordinator, VoidOutcome};
pub use error::BillingError;
