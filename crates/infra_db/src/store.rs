//! PostgreSQL implementation of the billing storage port
//!
//! One [`PgBillingTxn`] wraps one database transaction. Products are read
//! with `SELECT ... FOR UPDATE`, so two transactions touching the same
//! product serialize at the row lock; the configured `lock_timeout` turns
//! an indefinite wait into `StoreError::LockTimeout`. Dropping the
//! transaction without committing rolls it back - SQLx guarantees this -
//! which is what makes caller cancellation safe.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;
use uuid::Uuid;

use core_kernel::{CustomerId, InvoiceId, MovementId, OwnerId, ProductId};
use domain_billing::{
    BillingStore, BillingTxn, Invoice, InvoiceRef, NewStockMovement, StoreError,
};
use domain_catalog::{Customer, Product};

use crate::error::{store_err, DatabaseError};
use crate::rows::{discount_kind_str, CustomerRow, InvoiceRow, ProductRow};

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Billing store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgBillingStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgBillingStore {
    /// Creates a store with the default 5 second lock timeout
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Overrides how long a transaction may wait on a row lock
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

#[async_trait]
impl BillingStore for PgBillingStore {
    type Txn = PgBillingTxn;

    async fn begin(&self) -> Result<PgBillingTxn, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // SET LOCAL scopes the timeout to this transaction only; it does
        // not accept bind parameters, so the literal is formatted in
        let millis = self.lock_timeout.as_millis();
        sqlx::query(&format!("SET LOCAL lock_timeout = '{millis}ms'"))
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        Ok(PgBillingTxn { tx })
    }
}

/// One billing transaction against PostgreSQL
pub struct PgBillingTxn {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BillingTxn for PgBillingTxn {
    async fn product_for_update(
        &mut self,
        owner_id: OwnerId,
        product_id: ProductId,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT product_id, owner_id, name, sku, unit_price, tax_rate,
                   stock, low_stock_threshold, created_at, updated_at
            FROM products
            WHERE owner_id = $1 AND product_id = $2
            FOR UPDATE
            "#,
        )
        .bind(Uuid::from(owner_id))
        .bind(Uuid::from(product_id))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(store_err)?;

        row.map(ProductRow::into_domain)
            .transpose()
            .map_err(DatabaseError::into_store)
    }

    async fn set_product_stock(
        &mut self,
        product_id: ProductId,
        new_stock: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE products
            SET stock = $2, updated_at = now()
            WHERE product_id = $1
            "#,
        )
        .bind(Uuid::from(product_id))
        .bind(new_stock)
        .execute(&mut *self.tx)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn record_stock_movement(
        &mut self,
        movement: NewStockMovement,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                movement_id, product_id, owner_id, change_amount, reason, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, now())
            "#,
        )
        .bind(Uuid::from(MovementId::new_v7()))
        .bind(Uuid::from(movement.product_id))
        .bind(Uuid::from(movement.owner_id))
        .bind(movement.change)
        .bind(movement.reason)
        .execute(&mut *self.tx)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn customer(
        &mut self,
        owner_id: OwnerId,
        customer_id: CustomerId,
    ) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT customer_id, owner_id, name, email, phone, address, tax_id,
                   created_at, updated_at
            FROM customers
            WHERE owner_id = $1 AND customer_id = $2
            "#,
        )
        .bind(Uuid::from(owner_id))
        .bind(Uuid::from(customer_id))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(store_err)?;

        Ok(row.map(CustomerRow::into_domain))
    }

    async fn count_invoices_dated(
        &mut self,
        owner_id: OwnerId,
        date: NaiveDate,
    ) -> Result<u32, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM invoices
            WHERE owner_id = $1 AND (issued_at AT TIME ZONE 'UTC')::date = $2
            "#,
        )
        .bind(Uuid::from(owner_id))
        .bind(date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_err)?;

        Ok(count as u32)
    }

    async fn invoice_number_taken(
        &mut self,
        owner_id: OwnerId,
        number: &str,
    ) -> Result<bool, StoreError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM invoices WHERE owner_id = $1 AND invoice_number = $2
            )
            "#,
        )
        .bind(Uuid::from(owner_id))
        .bind(number)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_err)?;

        Ok(taken)
    }

    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError> {
        let items = serde_json::to_value(&invoice.items)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let customer_snapshot = invoice
            .customer_snapshot
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                invoice_id, owner_id, invoice_number, customer_id, customer_snapshot,
                items, discount_kind, discount_value, payment_method, total_amount,
                issued_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(Uuid::from(invoice.id))
        .bind(Uuid::from(invoice.owner_id))
        .bind(&invoice.invoice_number)
        .bind(invoice.customer_id.map(Uuid::from))
        .bind(customer_snapshot)
        .bind(items)
        .bind(discount_kind_str(invoice.discount.kind))
        .bind(invoice.discount.value)
        .bind(&invoice.payment_method)
        .bind(invoice.total_amount.amount())
        .bind(invoice.issued_at)
        .bind(invoice.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn find_invoice(
        &mut self,
        owner_id: OwnerId,
        reference: &InvoiceRef,
    ) -> Result<Option<Invoice>, StoreError> {
        const COLUMNS: &str = "invoice_id, owner_id, invoice_number, customer_id, \
             customer_snapshot, items, discount_kind, discount_value, \
             payment_method, total_amount, issued_at, created_at";

        // FOR UPDATE so two concurrent voids of the same invoice serialize:
        // the second waits, then observes the deleted row as not-found
        let row = match reference {
            InvoiceRef::Id(id) => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    "SELECT {COLUMNS} FROM invoices \
                     WHERE owner_id = $1 AND invoice_id = $2 FOR UPDATE"
                ))
                .bind(Uuid::from(owner_id))
                .bind(Uuid::from(*id))
                .fetch_optional(&mut *self.tx)
                .await
            }
            InvoiceRef::Number(number) => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    "SELECT {COLUMNS} FROM invoices \
                     WHERE owner_id = $1 AND invoice_number = $2 FOR UPDATE"
                ))
                .bind(Uuid::from(owner_id))
                .bind(number)
                .fetch_optional(&mut *self.tx)
                .await
            }
        }
        .map_err(store_err)?;

        row.map(InvoiceRow::into_domain)
            .transpose()
            .map_err(DatabaseError::into_store)
    }

    async fn delete_invoice(&mut self, invoice_id: InvoiceId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM invoices WHERE invoice_id = $1")
            .bind(Uuid::from(invoice_id))
            .execute(&mut *self.tx)
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(store_err)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(store_err)
    }
}
