//! Customer entity and snapshot
//!
//! Invoices reference customers optionally. Because a customer row may be
//! deleted after invoices were issued against it, the billing transaction
//! freezes the display fields into a `CustomerSnapshot` owned by the
//! invoice; historical documents stay intact whatever happens to the live
//! record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, OwnerId};

use crate::error::CatalogError;

/// A customer record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: CustomerId,
    /// Owning account
    pub owner_id: OwnerId,
    /// Display name
    pub name: String,
    /// Email address
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Tax identification number
    pub tax_id: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a new customer
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyField` if the name is blank.
    pub fn new(owner_id: OwnerId, name: impl Into<String>) -> Result<Self, CatalogError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::EmptyField("name"));
        }

        let now = Utc::now();
        Ok(Self {
            id: CustomerId::new_v7(),
            owner_id,
            name,
            email: None,
            phone: None,
            address: None,
            tax_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sets the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the postal address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the tax identification number
    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }
}

/// Frozen copy of a customer's display fields
///
/// Captured into the invoice at creation time and owned by it; independent
/// of the live customer row's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

impl From<&Customer> for CustomerSnapshot {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
            tax_id: customer.tax_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_customer() {
        let customer = Customer::new(OwnerId::new(), "Acme Traders")
            .unwrap()
            .with_email("orders@acme.example")
            .with_tax_id("29ABCDE1234F1Z5");

        assert_eq!(customer.name, "Acme Traders");
        assert_eq!(customer.email.as_deref(), Some("orders@acme.example"));
        assert!(customer.phone.is_none());
    }

    #[test]
    fn test_rejects_blank_name() {
        assert!(matches!(
            Customer::new(OwnerId::new(), "   "),
            Err(CatalogError::EmptyField("name"))
        ));
    }

    #[test]
    fn test_snapshot_captures_fields() {
        let customer = Customer::new(OwnerId::new(), "Acme Traders")
            .unwrap()
            .with_phone("+1-555-0100")
            .with_address("1 Main St");

        let snapshot = CustomerSnapshot::from(&customer);

        assert_eq!(snapshot.name, "Acme Traders");
        assert_eq!(snapshot.phone.as_deref(), Some("+1-555-0100"));
        assert_eq!(snapshot.address.as_deref(), Some("1 Main St"));
        assert!(snapshot.email.is_none());
    }

    #[test]
    fn test_snapshot_survives_customer_changes() {
        let mut customer = Customer::new(OwnerId::new(), "Before Rename").unwrap();
        let snapshot = CustomerSnapshot::from(&customer);

        customer.name = "After Rename".to_string();

        assert_eq!(snapshot.name, "Before Rename");
    }
}
