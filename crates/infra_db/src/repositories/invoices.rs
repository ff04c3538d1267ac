//! Invoice repository implementation
//!
//! Read-only access to the ledger. Invoices are only ever written by the
//! invoice coordinator and only ever removed by the void coordinator, both
//! through the transactional billing store.

use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::OwnerId;
use domain_billing::{Invoice, InvoiceRef};

use crate::error::DatabaseError;
use crate::rows::InvoiceRow;

const INVOICE_COLUMNS: &str = "invoice_id, owner_id, invoice_number, customer_id, \
     customer_snapshot, items, discount_kind, discount_value, \
     payment_method, total_amount, issued_at, created_at";

/// Repository for reading stored invoices
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists the owner's invoices, newest first
    pub async fn list(&self, owner_id: OwnerId) -> Result<Vec<Invoice>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices \
             WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(Uuid::from(owner_id))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InvoiceRow::into_domain).collect()
    }

    /// Fetches an invoice by id or number, scoped to the owner
    pub async fn get(
        &self,
        owner_id: OwnerId,
        reference: &InvoiceRef,
    ) -> Result<Option<Invoice>, DatabaseError> {
        let row = match reference {
            InvoiceRef::Id(id) => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    "SELECT {INVOICE_COLUMNS} FROM invoices \
                     WHERE owner_id = $1 AND invoice_id = $2"
                ))
                .bind(Uuid::from(owner_id))
                .bind(Uuid::from(*id))
                .fetch_optional(&self.pool)
                .await?
            }
            InvoiceRef::Number(number) => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    "SELECT {INVOICE_COLUMNS} FROM invoices \
                     WHERE owner_id = $1 AND invoice_number = $2"
                ))
                .bind(Uuid::from(owner_id))
                .bind(number)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        row.map(InvoiceRow::into_domain).transpose()
    }
}
