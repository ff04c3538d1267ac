//! Core Kernel - Foundational types and utilities for the billing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Tax rates expressed as validated percentages
//! - Strongly-typed identifiers

pub mod money;
pub mod identifiers;

pub use money::{Money, TaxRate, MoneyError};
pub use identifiers::{OwnerId, ProductId, CustomerId, InvoiceId, MovementId};
