//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL backing for the billing system,
//! implemented with SQLx.
//!
//! # Architecture
//!
//! Two access paths share one schema:
//!
//! - [`PgBillingStore`] implements the billing storage port
//!   (`domain_billing::ports`). Every invoice create/void runs inside one
//!   database transaction; products are read with `SELECT ... FOR UPDATE`
//!   so concurrent transactions touching the same row are totally ordered,
//!   and a `lock_timeout` bounds how long a waiter can block.
//! - The repositories in [`repositories`] serve the thin collaborator
//!   surfaces (product/customer CRUD, invoice reads). They never mutate
//!   stock - stock only moves through the transactional port.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PgBillingStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/billing")).await?;
//! infra_db::MIGRATOR.run(&pool).await?;
//! let store = PgBillingStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod store;
pub mod repositories;

pub(crate) mod rows;

pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use store::PgBillingStore;
pub use repositories::{CustomerRepository, InvoiceRepository, ProductRepository};

/// Embedded schema migrations, applied by the server binary at startup
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
