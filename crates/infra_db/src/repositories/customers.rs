//! Customer repository implementation
//!
//! Deleting a customer leaves issued invoices untouched: the invoice row
//! keeps its frozen snapshot and the foreign key nulls out.

use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{CustomerId, OwnerId};
use domain_catalog::Customer;

use crate::error::DatabaseError;
use crate::rows::CustomerRow;

const CUSTOMER_COLUMNS: &str =
    "customer_id, owner_id, name, email, phone, address, tax_id, created_at, updated_at";

/// Repository for customer records
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new customer
    pub async fn insert(&self, customer: &Customer) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO customers (
                customer_id, owner_id, name, email, phone, address, tax_id,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::from(customer.id))
        .bind(Uuid::from(customer.owner_id))
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.tax_id)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches a customer scoped to the owner
    pub async fn get(
        &self,
        owner_id: OwnerId,
        customer_id: CustomerId,
    ) -> Result<Option<Customer>, DatabaseError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE owner_id = $1 AND customer_id = $2"
        ))
        .bind(Uuid::from(owner_id))
        .bind(Uuid::from(customer_id))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CustomerRow::into_domain))
    }

    /// Lists the owner's customers, newest first
    pub async fn list(&self, owner_id: OwnerId) -> Result<Vec<Customer>, DatabaseError> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(Uuid::from(owner_id))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CustomerRow::into_domain).collect())
    }

    /// Updates a customer's contact fields
    pub async fn update(&self, customer: &Customer) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = $3, email = $4, phone = $5, address = $6, tax_id = $7,
                updated_at = now()
            WHERE owner_id = $1 AND customer_id = $2
            "#,
        )
        .bind(Uuid::from(customer.owner_id))
        .bind(Uuid::from(customer.id))
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.tax_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a customer scoped to the owner
    pub async fn delete(
        &self,
        owner_id: OwnerId,
        customer_id: CustomerId,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM customers WHERE owner_id = $1 AND customer_id = $2",
        )
        .bind(Uuid::from(owner_id))
        .bind(Uuid::from(customer_id))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
