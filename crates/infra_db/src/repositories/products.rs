//! Product repository implementation

use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{OwnerId, ProductId};
use domain_catalog::Product;

use crate::error::DatabaseError;
use crate::rows::ProductRow;

const PRODUCT_COLUMNS: &str = "product_id, owner_id, name, sku, unit_price, tax_rate, \
     stock, low_stock_threshold, created_at, updated_at";

/// Repository for product records
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Creates a new ProductRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new product
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` when the owner already has
    /// a product with this SKU.
    pub async fn insert(&self, product: &Product) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                product_id, owner_id, name, sku, unit_price, tax_rate,
                stock, low_stock_threshold, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(Uuid::from(product.id))
        .bind(Uuid::from(product.owner_id))
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.unit_price.amount())
        .bind(product.tax_rate.percent())
        .bind(product.stock)
        .bind(product.low_stock_threshold)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches a product scoped to the owner
    pub async fn get(
        &self,
        owner_id: OwnerId,
        product_id: ProductId,
    ) -> Result<Option<Product>, DatabaseError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE owner_id = $1 AND product_id = $2"
        ))
        .bind(Uuid::from(owner_id))
        .bind(Uuid::from(product_id))
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductRow::into_domain).transpose()
    }

    /// Lists the owner's products, newest first
    pub async fn list(&self, owner_id: OwnerId) -> Result<Vec<Product>, DatabaseError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(Uuid::from(owner_id))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_domain).collect()
    }

    /// Lists products at or below their low-stock threshold
    pub async fn find_low_stock(&self, owner_id: OwnerId) -> Result<Vec<Product>, DatabaseError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE owner_id = $1 AND stock <= low_stock_threshold \
             ORDER BY stock ASC"
        ))
        .bind(Uuid::from(owner_id))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_domain).collect()
    }

    /// Updates a product's editable fields
    ///
    /// # Returns
    ///
    /// The number of rows changed; zero means no such product for this
    /// owner.
    pub async fn update(&self, product: &Product) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $3, sku = $4, unit_price = $5, tax_rate = $6,
                stock = $7, low_stock_threshold = $8, updated_at = now()
            WHERE owner_id = $1 AND product_id = $2
            "#,
        )
        .bind(Uuid::from(product.owner_id))
        .bind(Uuid::from(product.id))
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.unit_price.amount())
        .bind(product.tax_rate.percent())
        .bind(product.stock)
        .bind(product.low_stock_threshold)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a product scoped to the owner
    pub async fn delete(
        &self,
        owner_id: OwnerId,
        product_id: ProductId,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM products WHERE owner_id = $1 AND product_id = $2",
        )
        .bind(Uuid::from(owner_id))
        .bind(Uuid::from(product_id))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
