//! Catalog Domain - Products and Customers
//!
//! This crate holds the entities the billing transaction operates on:
//! products (with their live stock counters) and customers (with the
//! frozen snapshot type that protects invoice history from later edits).
//!
//! Stock is never mutated here; all stock movement happens through the
//! billing transaction so the non-negative invariant is enforced in one
//! place, under a storage-level row lock.

pub mod product;
pub mod customer;
pub mod error;

pub use product::Product;
pub use customer::{Customer, CustomerSnapshot};
pub use error::CatalogError;
