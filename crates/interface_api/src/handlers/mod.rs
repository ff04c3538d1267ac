//! Request handlers

pub mod invoices;
pub mod products;
pub mod customers;
pub mod health;
