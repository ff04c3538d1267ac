//! Void coordinator
//!
//! Reverses a committed invoice: restores every touched product's stock
//! from the stored snapshots, writes reversing inventory-log entries, and
//! deletes the invoice row - atomically. Only the snapshot's `product_id`
//! and `quantity` are trusted; the product may have been renamed, repriced,
//! or deleted since the sale. A deleted product skips its stock
//! restoration but never blocks the void: the bookkeeping side must still
//! complete.

use core_kernel::{OwnerId, ProductId};

use crate::error::BillingError;
use crate::invoice::{Invoice, InvoiceRef};
use crate::ports::{BillingStore, BillingTxn, NewStockMovement};

/// Result of a successful void
#[derive(Debug, Clone)]
pub struct VoidOutcome {
    /// The invoice that was removed
    pub invoice: Invoice,
    /// Products whose stock was restored
    pub restored_products: Vec<ProductId>,
    /// Products that no longer exist; their restoration was skipped
    pub skipped_products: Vec<ProductId>,
}

/// Coordinates the invoice-void transaction
#[derive(Debug, Clone)]
pub struct VoidCoordinator<S> {
    store: S,
    log_inventory: bool,
}

impl<S: BillingStore> VoidCoordinator<S> {
    /// Creates a coordinator with inventory logging enabled
    pub fn new(store: S) -> Self {
        Self {
            store,
            log_inventory: true,
        }
    }

    /// Disables the reversing inventory-log entries
    pub fn without_inventory_log(mut self) -> Self {
        self.log_inventory = false;
        self
    }

    /// Voids an invoice atomically
    ///
    /// The invoice may be addressed by id or by number. Voiding the same
    /// invoice twice fails the second time with
    /// [`BillingError::InvoiceNotFound`] - the delete makes the operation
    /// naturally idempotent, stock is never double-restored.
    ///
    /// # Errors
    ///
    /// [`BillingError::InvoiceNotFound`] if no invoice matches for this
    /// owner; storage errors roll the transaction back entirely.
    pub async fn void_invoice(
        &self,
        owner_id: OwnerId,
        reference: &InvoiceRef,
    ) -> Result<VoidOutcome, BillingError> {
        let mut txn = self.store.begin().await?;
        match self.run(&mut txn, owner_id, reference).await {
            Ok(outcome) => {
                txn.commit().await?;
                tracing::info!(
                    owner = %owner_id,
                    invoice_number = %outcome.invoice.invoice_number,
                    restored = outcome.restored_products.len(),
                    skipped = outcome.skipped_products.len(),
                    "invoice voided"
                );
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback after failed void");
                }
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        txn: &mut S::Txn,
        owner_id: OwnerId,
        reference: &InvoiceRef,
    ) -> Result<VoidOutcome, BillingError> {
        let invoice = txn
            .find_invoice(owner_id, reference)
            .await?
            .ok_or_else(|| BillingError::InvoiceNotFound(reference.to_string()))?;

        let mut restored_products = Vec::with_capacity(invoice.items.len());
        let mut skipped_products = Vec::new();

        for item in &invoice.items {
            match txn.product_for_update(owner_id, item.product_id).await? {
                Some(product) => {
                    txn.set_product_stock(product.id, product.stock + i64::from(item.quantity))
                        .await?;
                    if self.log_inventory {
                        txn.record_stock_movement(NewStockMovement {
                            product_id: product.id,
                            owner_id,
                            change: i64::from(item.quantity),
                            reason: format!("Void: {}", invoice.invoice_number),
                        })
                        .await?;
                    }
                    restored_products.push(product.id);
                }
                None => {
                    // Recorded anomaly, not a hard failure
                    tracing::warn!(
                        product = %item.product_id,
                        invoice_number = %invoice.invoice_number,
                        "product no longer exists; stock not restored"
                    );
                    skipped_products.push(item.product_id);
                }
            }
        }

        txn.delete_invoice(invoice.id).await?;

        Ok(VoidOutcome {
            invoice,
            restored_products,
            skipped_products,
        })
    }
}
