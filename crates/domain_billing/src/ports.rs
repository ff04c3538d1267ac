//! Billing storage port
//!
//! The single storage-agnostic transaction contract the coordinators run
//! against. An implementation provides transactions with row-level
//! exclusive locking (`product_for_update`); the coordinators never hold
//! in-process locks, so multiple server processes can safely share one
//! store.
//!
//! # Adapters
//!
//! - **PostgreSQL** (`infra_db::PgBillingStore`): `SELECT ... FOR UPDATE`
//!   with a configurable lock timeout.
//! - **In-memory mock** (`ports::mock::MemoryBillingStore`): serializable
//!   transactions over an owned mutex guard, for tests.
//!
//! Dropping a transaction without committing must roll it back; this is
//! what makes caller cancellation safe.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use core_kernel::{CustomerId, InvoiceId, OwnerId, ProductId};
use domain_catalog::{Customer, Product};

use crate::invoice::{Invoice, InvoiceRef};

/// Errors surfaced by storage adapters
///
/// This is the transient/infrastructure class of the billing error
/// taxonomy: the only class callers may retry. `Connection` and
/// `LockTimeout` report true from [`StoreError::is_transient`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to reach the underlying store
    #[error("Storage connection failed: {0}")]
    Connection(String),

    /// A row lock could not be acquired within the configured deadline
    #[error("Lock wait timed out: {0}")]
    LockTimeout(String),

    /// Unique constraint violation
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Check or foreign-key constraint violation
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Snapshot encoding/decoding failed
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Any other query failure
    #[error("Query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// True for failures a caller may reasonably retry
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Connection(_) | StoreError::LockTimeout(_))
    }
}

/// An inventory-log entry to record inside the transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockMovement {
    pub product_id: ProductId,
    pub owner_id: OwnerId,
    /// Signed change: negative on sale, positive on void
    pub change: i64,
    /// Human-readable reason referencing the invoice number
    pub reason: String,
}

/// Factory for billing transactions
#[async_trait]
pub trait BillingStore: Send + Sync {
    type Txn: BillingTxn;

    /// Opens a new transaction
    async fn begin(&self) -> Result<Self::Txn, StoreError>;
}

/// One atomic unit of billing work
///
/// All reads and writes made through a transaction become visible to other
/// transactions only at commit; dropping the value rolls everything back.
#[async_trait]
pub trait BillingTxn: Send {
    /// Fetches a product with an exclusive row lock, scoped to the owner
    async fn product_for_update(
        &mut self,
        owner_id: OwnerId,
        product_id: ProductId,
    ) -> Result<Option<Product>, StoreError>;

    /// Writes a product's new stock level
    async fn set_product_stock(
        &mut self,
        product_id: ProductId,
        new_stock: i64,
    ) -> Result<(), StoreError>;

    /// Appends an inventory-log entry
    async fn record_stock_movement(
        &mut self,
        movement: NewStockMovement,
    ) -> Result<(), StoreError>;

    /// Fetches a customer scoped to the owner
    async fn customer(
        &mut self,
        owner_id: OwnerId,
        customer_id: CustomerId,
    ) -> Result<Option<Customer>, StoreError>;

    /// Counts the owner's invoices issued on the given date
    async fn count_invoices_dated(
        &mut self,
        owner_id: OwnerId,
        date: NaiveDate,
    ) -> Result<u32, StoreError>;

    /// True if the owner already has an invoice with this number
    async fn invoice_number_taken(
        &mut self,
        owner_id: OwnerId,
        number: &str,
    ) -> Result<bool, StoreError>;

    /// Persists a complete invoice with its serialized snapshots
    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError>;

    /// Fetches an invoice by id or number, scoped to the owner
    async fn find_invoice(
        &mut self,
        owner_id: OwnerId,
        reference: &InvoiceRef,
    ) -> Result<Option<Invoice>, StoreError>;

    /// Removes an invoice row
    async fn delete_invoice(&mut self, invoice_id: InvoiceId) -> Result<(), StoreError>;

    /// Makes the transaction's effects visible
    async fn commit(self) -> Result<(), StoreError>;

    /// Discards the transaction's effects
    async fn rollback(self) -> Result<(), StoreError>;
}

/// In-memory implementation of the storage port for tests
///
/// Transactions are fully serializable: `begin` takes an owned guard over
/// the whole state and mutates a working copy, which `commit` publishes.
/// That is stricter isolation than the row locks a database provides, but
/// it preserves the property the coordinators rely on - two transactions
/// touching the same product are totally ordered.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::{Mutex, OwnedMutexGuard};

    #[derive(Debug, Default, Clone)]
    struct MemoryState {
        products: HashMap<ProductId, Product>,
        customers: HashMap<CustomerId, Customer>,
        invoices: Vec<Invoice>,
        movements: Vec<NewStockMovement>,
    }

    /// In-memory billing store
    #[derive(Debug, Default, Clone)]
    pub struct MemoryBillingStore {
        state: Arc<Mutex<MemoryState>>,
    }

    impl MemoryBillingStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts a product directly, outside any transaction
        pub async fn seed_product(&self, product: Product) {
            self.state
                .lock()
                .await
                .products
                .insert(product.id, product);
        }

        /// Inserts a customer directly, outside any transaction
        pub async fn seed_customer(&self, customer: Customer) {
            self.state
                .lock()
                .await
                .customers
                .insert(customer.id, customer);
        }

        /// Removes a product, simulating catalog deletion
        pub async fn remove_product(&self, product_id: ProductId) {
            self.state.lock().await.products.remove(&product_id);
        }

        /// Current stock of a product, if it exists
        pub async fn stock_of(&self, product_id: ProductId) -> Option<i64> {
            self.state
                .lock()
                .await
                .products
                .get(&product_id)
                .map(|p| p.stock)
        }

        /// Number of stored invoices
        pub async fn invoice_count(&self) -> usize {
            self.state.lock().await.invoices.len()
        }

        /// All stored invoices
        pub async fn invoices(&self) -> Vec<Invoice> {
            self.state.lock().await.invoices.clone()
        }

        /// All recorded stock movements
        pub async fn movements(&self) -> Vec<NewStockMovement> {
            self.state.lock().await.movements.clone()
        }
    }

    /// A serializable in-memory transaction
    pub struct MemoryTxn {
        guard: OwnedMutexGuard<MemoryState>,
        working: MemoryState,
    }

    #[async_trait]
    impl BillingStore for MemoryBillingStore {
        type Txn = MemoryTxn;

        async fn begin(&self) -> Result<MemoryTxn, StoreError> {
            let guard = Arc::clone(&self.state).lock_owned().await;
            let working = guard.clone();
            Ok(MemoryTxn { guard, working })
        }
    }

    #[async_trait]
    impl BillingTxn for MemoryTxn {
        async fn product_for_update(
            &mut self,
            owner_id: OwnerId,
            product_id: ProductId,
        ) -> Result<Option<Product>, StoreError> {
            Ok(self
                .working
                .products
                .get(&product_id)
                .filter(|p| p.owner_id == owner_id)
                .cloned())
        }

        async fn set_product_stock(
            &mut self,
            product_id: ProductId,
            new_stock: i64,
        ) -> Result<(), StoreError> {
            if new_stock < 0 {
                return Err(StoreError::Constraint(format!(
                    "stock must not be negative, got {new_stock}"
                )));
            }
            match self.working.products.get_mut(&product_id) {
                Some(product) => {
                    product.stock = new_stock;
                    Ok(())
                }
                None => Err(StoreError::Query(format!(
                    "product {product_id} not found"
                ))),
            }
        }

        async fn record_stock_movement(
            &mut self,
            movement: NewStockMovement,
        ) -> Result<(), StoreError> {
            self.working.movements.push(movement);
            Ok(())
        }

        async fn customer(
            &mut self,
            owner_id: OwnerId,
            customer_id: CustomerId,
        ) -> Result<Option<Customer>, StoreError> {
            Ok(self
                .working
                .customers
                .get(&customer_id)
                .filter(|c| c.owner_id == owner_id)
                .cloned())
        }

        async fn count_invoices_dated(
            &mut self,
            owner_id: OwnerId,
            date: NaiveDate,
        ) -> Result<u32, StoreError> {
            let count = self
                .working
                .invoices
                .iter()
                .filter(|i| i.owner_id == owner_id && i.issued_at.date_naive() == date)
                .count();
            Ok(count as u32)
        }

        async fn invoice_number_taken(
            &mut self,
            owner_id: OwnerId,
            number: &str,
        ) -> Result<bool, StoreError> {
            Ok(self
                .working
                .invoices
                .iter()
                .any(|i| i.owner_id == owner_id && i.invoice_number == number))
        }

        async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError> {
            if self
                .working
                .invoices
                .iter()
                .any(|i| i.owner_id == invoice.owner_id && i.invoice_number == invoice.invoice_number)
            {
                return Err(StoreError::Duplicate(invoice.invoice_number.clone()));
            }
            self.working.invoices.push(invoice.clone());
            Ok(())
        }

        async fn find_invoice(
            &mut self,
            owner_id: OwnerId,
            reference: &InvoiceRef,
        ) -> Result<Option<Invoice>, StoreError> {
            Ok(self
                .working
                .invoices
                .iter()
                .find(|i| {
                    i.owner_id == owner_id
                        && match reference {
                            InvoiceRef::Id(id) => i.id == *id,
                            InvoiceRef::Number(number) => i.invoice_number == *number,
                        }
                })
                .cloned())
        }

        async fn delete_invoice(&mut self, invoice_id: InvoiceId) -> Result<(), StoreError> {
            self.working.invoices.retain(|i| i.id != invoice_id);
            Ok(())
        }

        async fn commit(mut self) -> Result<(), StoreError> {
            *self.guard = self.working;
            Ok(())
        }

        async fn rollback(self) -> Result<(), StoreError> {
            Ok(())
        }
    }
}
