//! Repository implementations
//!
//! Owner-scoped data access for the collaborator surfaces. Every query
//! filters by the owning account - the tenancy boundary is enforced here,
//! not in the handlers. Stock is read-only from this path; all stock
//! mutation goes through the transactional billing store.

pub mod products;
pub mod customers;
pub mod invoices;

pub use products::ProductRepository;
pub use customers::CustomerRepository;
pub use invoices::InvoiceRepository;
