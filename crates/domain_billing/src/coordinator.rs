//! Invoice transaction coordinator
//!
//! Orchestrates invoice creation as one atomic unit: validate the customer,
//! lock and decrement stock line by line, price the snapshots, resolve the
//! invoice number, persist, commit. Any failure at any step rolls the whole
//! transaction back; no partial stock mutation is ever observable.
//!
//! Stock is decremented immediately inside the transaction, while the row
//! lock from `product_for_update` is held. Concurrent creators touching the
//! same product therefore serialize at the storage layer instead of racing
//! past the availability check.

use chrono::Utc;

use core_kernel::{InvoiceId, OwnerId};
use domain_catalog::{CustomerSnapshot, Product};

use crate::error::BillingError;
use crate::invoice::{invoice_number_for, CreateInvoice, Invoice, ItemSnapshot};
use crate::ports::{BillingStore, BillingTxn, NewStockMovement, StoreError};
use crate::pricing::{self, LineInput};

/// Coordinates the invoice-creation transaction
#[derive(Debug, Clone)]
pub struct InvoiceCoordinator<S> {
    store: S,
    log_inventory: bool,
}

impl<S: BillingStore> InvoiceCoordinator<S> {
    /// Creates a coordinator with inventory logging enabled
    pub fn new(store: S) -> Self {
        Self {
            store,
            log_inventory: true,
        }
    }

    /// Disables the per-line inventory-log entries
    pub fn without_inventory_log(mut self) -> Self {
        self.log_inventory = false;
        self
    }

    /// Creates an invoice atomically
    ///
    /// Validates every line against live inventory under exclusive row
    /// locks, decrements stock, freezes line snapshots from the locked
    /// product rows, prices them, resolves the invoice number, and
    /// persists the result. Returns the full persisted invoice.
    ///
    /// # Errors
    ///
    /// Any [`BillingError`]; the transaction is fully rolled back on every
    /// error path, so stock and invoice state are exactly as before the
    /// call.
    pub async fn create_invoice(
        &self,
        owner_id: OwnerId,
        request: CreateInvoice,
    ) -> Result<Invoice, BillingError> {
        if request.items.is_empty() {
            return Err(BillingError::EmptyInvoice);
        }

        let mut txn = self.store.begin().await?;
        match self.run(&mut txn, owner_id, request).await {
            Ok(invoice) => {
                txn.commit().await?;
                tracing::info!(
                    owner = %owner_id,
                    invoice_number = %invoice.invoice_number,
                    total = %invoice.total_amount,
                    lines = invoice.items.len(),
                    "invoice created"
                );
                Ok(invoice)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback after failed create");
                }
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        txn: &mut S::Txn,
        owner_id: OwnerId,
        request: CreateInvoice,
    ) -> Result<Invoice, BillingError> {
        let customer_snapshot = match request.customer_id {
            Some(customer_id) => {
                let customer = txn
                    .customer(owner_id, customer_id)
                    .await?
                    .ok_or(BillingError::CustomerNotFound { customer_id })?;
                Some(CustomerSnapshot::from(&customer))
            }
            None => None,
        };

        let issued_at = request.issued_at.unwrap_or_else(Utc::now);

        // Lock, validate, and decrement in input order. The decrement
        // happens here, inside the transaction, so the stock invariant is
        // enforced while the row lock is held.
        let mut locked: Vec<(Product, u32)> = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let product = txn
                .product_for_update(owner_id, line.product_id)
                .await?
                .ok_or(BillingError::ProductNotFound {
                    product_id: line.product_id,
                })?;

            if line.quantity == 0 {
                return Err(BillingError::InvalidQuantity {
                    product_id: line.product_id,
                });
            }
            if !product.has_stock(line.quantity) {
                return Err(BillingError::InsufficientStock {
                    product_id: line.product_id,
                    available: product.stock,
                    requested: line.quantity,
                });
            }

            txn.set_product_stock(product.id, product.stock - i64::from(line.quantity))
                .await?;
            locked.push((product, line.quantity));
        }

        let inputs: Vec<LineInput> = locked
            .iter()
            .map(|(product, quantity)| LineInput {
                unit_price: product.unit_price,
                tax_rate: product.tax_rate,
                quantity: *quantity,
            })
            .collect();
        let breakdown = pricing::price(&inputs, &request.discount)?;

        let invoice_number = match request.invoice_number {
            Some(number) => number,
            None => {
                let existing = txn
                    .count_invoices_dated(owner_id, issued_at.date_naive())
                    .await?;
                invoice_number_for(issued_at.date_naive(), existing + 1)
            }
        };
        if txn.invoice_number_taken(owner_id, &invoice_number).await? {
            return Err(BillingError::DuplicateInvoiceNumber(invoice_number));
        }

        let items: Vec<ItemSnapshot> = locked
            .into_iter()
            .zip(breakdown.lines.iter())
            .map(|((product, quantity), priced)| ItemSnapshot {
                product_id: product.id,
                name: product.name,
                sku: product.sku,
                unit_price: product.unit_price,
                tax_rate: product.tax_rate,
                quantity,
                subtotal: priced.subtotal,
                tax_amount: priced.tax_amount,
                line_total: priced.line_total,
            })
            .collect();

        let invoice = Invoice {
            id: InvoiceId::new_v7(),
            owner_id,
            invoice_number,
            customer_id: request.customer_id,
            customer_snapshot,
            items,
            discount: request.discount,
            payment_method: request.payment_method,
            total_amount: breakdown.final_total,
            issued_at,
            created_at: Utc::now(),
        };

        // The unique constraint still backs the explicit check above;
        // report a constraint hit as the same conflict
        match txn.insert_invoice(&invoice).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                return Err(BillingError::DuplicateInvoiceNumber(
                    invoice.invoice_number,
                ))
            }
            Err(err) => return Err(err.into()),
        }

        if self.log_inventory {
            for item in &invoice.items {
                txn.record_stock_movement(NewStockMovement {
                    product_id: item.product_id,
                    owner_id,
                    change: -i64::from(item.quantity),
                    reason: format!("Sale: {}", invoice.invoice_number),
                })
                .await?;
            }
        }

        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::LineItem;
    use crate::ports::mock::MemoryBillingStore;
    use crate::pricing::Discount;
    use chrono::TimeZone;
    use core_kernel::{CustomerId, Money, ProductId, TaxRate};
    use domain_catalog::Customer;
    use rust_decimal_macros::dec;

    async fn seeded_store(stock: i64) -> (MemoryBillingStore, OwnerId, ProductId) {
        let store = MemoryBillingStore::new();
        let owner = OwnerId::new();
        let product = Product::new(
            owner,
            "Widget",
            "WID-001",
            Money::new(dec!(100)),
            TaxRate::new(dec!(18)).unwrap(),
            stock,
        )
        .unwrap();
        let product_id = product.id;
        store.seed_product(product).await;
        (store, owner, product_id)
    }

    #[tokio::test]
    async fn creates_invoice_and_decrements_stock() {
        let (store, owner, product_id) = seeded_store(10).await;
        let coordinator = InvoiceCoordinator::new(store.clone());

        let invoice = coordinator
            .create_invoice(
                owner,
                CreateInvoice::new(vec![LineItem::new(product_id, 2)])
                    .with_discount(Discount::flat(dec!(36))),
            )
            .await
            .unwrap();

        // price=100, tax=18%, qty=2: subtotal 200, tax 36, line 236; flat 36 -> 200
        assert_eq!(invoice.items[0].subtotal.amount(), dec!(200));
        assert_eq!(invoice.items[0].tax_amount.amount(), dec!(36));
        assert_eq!(invoice.items[0].line_total.amount(), dec!(236));
        assert_eq!(invoice.total_amount.amount(), dec!(200));

        assert_eq!(store.stock_of(product_id).await, Some(8));
        assert_eq!(store.invoice_count().await, 1);

        let movements = store.movements().await;
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].change, -2);
        assert!(movements[0].reason.contains(&invoice.invoice_number));
    }

    #[tokio::test]
    async fn empty_request_is_rejected() {
        let (store, owner, _) = seeded_store(10).await;
        let coordinator = InvoiceCoordinator::new(store);

        let result = coordinator
            .create_invoice(owner, CreateInvoice::new(vec![]))
            .await;
        assert!(matches!(result, Err(BillingError::EmptyInvoice)));
    }

    #[tokio::test]
    async fn unknown_product_aborts_whole_invoice() {
        let (store, owner, product_id) = seeded_store(10).await;
        let coordinator = InvoiceCoordinator::new(store.clone());

        let result = coordinator
            .create_invoice(
                owner,
                CreateInvoice::new(vec![
                    LineItem::new(product_id, 2),
                    LineItem::new(ProductId::new(), 1),
                ]),
            )
            .await;

        assert!(matches!(result, Err(BillingError::ProductNotFound { .. })));
        // first line's decrement must have been rolled back
        assert_eq!(store.stock_of(product_id).await, Some(10));
        assert_eq!(store.invoice_count().await, 0);
        assert!(store.movements().await.is_empty());
    }

    #[tokio::test]
    async fn zero_quantity_is_invalid() {
        let (store, owner, product_id) = seeded_store(10).await;
        let coordinator = InvoiceCoordinator::new(store.clone());

        let result = coordinator
            .create_invoice(owner, CreateInvoice::new(vec![LineItem::new(product_id, 0)]))
            .await;

        assert!(matches!(result, Err(BillingError::InvalidQuantity { .. })));
        assert_eq!(store.stock_of(product_id).await, Some(10));
    }

    #[tokio::test]
    async fn insufficient_stock_reports_available_and_requested() {
        let (store, owner, product_id) = seeded_store(4).await;
        let coordinator = InvoiceCoordinator::new(store.clone());

        let result = coordinator
            .create_invoice(owner, CreateInvoice::new(vec![LineItem::new(product_id, 6)]))
            .await;

        match result {
            Err(BillingError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 4);
                assert_eq!(requested, 6);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(store.stock_of(product_id).await, Some(4));
    }

    #[tokio::test]
    async fn failure_on_third_of_five_lines_leaves_no_trace() {
        let store = MemoryBillingStore::new();
        let owner = OwnerId::new();
        let mut ids = Vec::new();
        for (index, stock) in [20i64, 20, 1, 20, 20].iter().enumerate() {
            let product = Product::new(
                owner,
                format!("Product {index}"),
                format!("SKU-{index}"),
                Money::new(dec!(10)),
                TaxRate::zero(),
                *stock,
            )
            .unwrap();
            ids.push(product.id);
            store.seed_product(product).await;
        }

        let coordinator = InvoiceCoordinator::new(store.clone());
        let result = coordinator
            .create_invoice(
                owner,
                CreateInvoice::new(ids.iter().map(|id| LineItem::new(*id, 5)).collect()),
            )
            .await;

        assert!(matches!(
            result,
            Err(BillingError::InsufficientStock { .. })
        ));
        // no stock changed, no invoice row exists
        for (id, stock) in ids.iter().zip([20i64, 20, 1, 20, 20]) {
            assert_eq!(store.stock_of(*id).await, Some(stock));
        }
        assert_eq!(store.invoice_count().await, 0);
    }

    #[tokio::test]
    async fn invalid_discount_rolls_back_stock() {
        let (store, owner, product_id) = seeded_store(10).await;
        let coordinator = InvoiceCoordinator::new(store.clone());

        let result = coordinator
            .create_invoice(
                owner,
                CreateInvoice::new(vec![LineItem::new(product_id, 2)])
                    .with_discount(Discount::percentage(dec!(110))),
            )
            .await;

        assert!(matches!(result, Err(BillingError::InvalidDiscount(_))));
        assert_eq!(store.stock_of(product_id).await, Some(10));
        assert_eq!(store.invoice_count().await, 0);
    }

    #[tokio::test]
    async fn other_owners_products_are_invisible() {
        let (store, _, product_id) = seeded_store(10).await;
        let coordinator = InvoiceCoordinator::new(store.clone());
        let other_owner = OwnerId::new();

        let result = coordinator
            .create_invoice(
                other_owner,
                CreateInvoice::new(vec![LineItem::new(product_id, 1)]),
            )
            .await;

        assert!(matches!(result, Err(BillingError::ProductNotFound { .. })));
        assert_eq!(store.stock_of(product_id).await, Some(10));
    }

    #[tokio::test]
    async fn unknown_customer_is_rejected_before_stock_changes() {
        let (store, owner, product_id) = seeded_store(10).await;
        let coordinator = InvoiceCoordinator::new(store.clone());

        let result = coordinator
            .create_invoice(
                owner,
                CreateInvoice::new(vec![LineItem::new(product_id, 1)])
                    .with_customer(CustomerId::new()),
            )
            .await;

        assert!(matches!(result, Err(BillingError::CustomerNotFound { .. })));
        assert_eq!(store.stock_of(product_id).await, Some(10));
    }

    #[tokio::test]
    async fn customer_snapshot_is_frozen_into_invoice() {
        let (store, owner, product_id) = seeded_store(10).await;
        let customer = Customer::new(owner, "Acme Traders")
            .unwrap()
            .with_email("orders@acme.example");
        let customer_id = customer.id;
        store.seed_customer(customer).await;

        let coordinator = InvoiceCoordinator::new(store);
        let invoice = coordinator
            .create_invoice(
                owner,
                CreateInvoice::new(vec![LineItem::new(product_id, 1)]).with_customer(customer_id),
            )
            .await
            .unwrap();

        let snapshot = invoice.customer_snapshot.unwrap();
        assert_eq!(snapshot.name, "Acme Traders");
        assert_eq!(snapshot.email.as_deref(), Some("orders@acme.example"));
    }

    #[tokio::test]
    async fn generated_numbers_sequence_per_day() {
        let (store, owner, product_id) = seeded_store(100).await;
        let coordinator = InvoiceCoordinator::new(store);
        let issued_at = chrono::Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();

        for _ in 0..2 {
            coordinator
                .create_invoice(
                    owner,
                    CreateInvoice::new(vec![LineItem::new(product_id, 1)]).dated(issued_at),
                )
                .await
                .unwrap();
        }

        // two prior invoices today -> generated number ends in -003
        let third = coordinator
            .create_invoice(
                owner,
                CreateInvoice::new(vec![LineItem::new(product_id, 1)]).dated(issued_at),
            )
            .await
            .unwrap();

        assert_eq!(third.invoice_number, "INV-20240307-003");
    }

    #[tokio::test]
    async fn supplied_duplicate_number_conflicts() {
        let (store, owner, product_id) = seeded_store(10).await;
        let coordinator = InvoiceCoordinator::new(store.clone());

        coordinator
            .create_invoice(
                owner,
                CreateInvoice::new(vec![LineItem::new(product_id, 1)]).with_number("INV-CUSTOM-1"),
            )
            .await
            .unwrap();

        let result = coordinator
            .create_invoice(
                owner,
                CreateInvoice::new(vec![LineItem::new(product_id, 1)]).with_number("INV-CUSTOM-1"),
            )
            .await;

        assert!(matches!(
            result,
            Err(BillingError::DuplicateInvoiceNumber(n)) if n == "INV-CUSTOM-1"
        ));
        // the failed attempt's decrement must not stick
        assert_eq!(store.stock_of(product_id).await, Some(9));
    }

    #[tokio::test]
    async fn inventory_log_can_be_disabled() {
        let (store, owner, product_id) = seeded_store(10).await;
        let coordinator = InvoiceCoordinator::new(store.clone()).without_inventory_log();

        coordinator
            .create_invoice(owner, CreateInvoice::new(vec![LineItem::new(product_id, 3)]))
            .await
            .unwrap();

        assert!(store.movements().await.is_empty());
        assert_eq!(store.stock_of(product_id).await, Some(7));
    }

    #[tokio::test]
    async fn snapshots_preserve_input_order() {
        let store = MemoryBillingStore::new();
        let owner = OwnerId::new();
        let mut ids = Vec::new();
        for (name, sku) in [("First", "SKU-1"), ("Second", "SKU-2"), ("Third", "SKU-3")] {
            let product = Product::new(
                owner,
                name,
                sku,
                Money::new(dec!(5)),
                TaxRate::zero(),
                10,
            )
            .unwrap();
            ids.push(product.id);
            store.seed_product(product).await;
        }

        let coordinator = InvoiceCoordinator::new(store);
        let invoice = coordinator
            .create_invoice(
                owner,
                CreateInvoice::new(vec![
                    LineItem::new(ids[2], 1),
                    LineItem::new(ids[0], 1),
                    LineItem::new(ids[1], 1),
                ]),
            )
            .await
            .unwrap();

        let names: Vec<&str> = invoice.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Third", "First", "Second"]);
    }

    #[tokio::test]
    async fn concurrent_creates_serialize_on_stock() {
        let (store, owner, product_id) = seeded_store(10).await;

        let a = {
            let coordinator = InvoiceCoordinator::new(store.clone());
            tokio::spawn(async move {
                coordinator
                    .create_invoice(owner, CreateInvoice::new(vec![LineItem::new(product_id, 6)]))
                    .await
            })
        };
        let b = {
            let coordinator = InvoiceCoordinator::new(store.clone());
            tokio::spawn(async move {
                coordinator
                    .create_invoice(owner, CreateInvoice::new(vec![LineItem::new(product_id, 6)]))
                    .await
            })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(BillingError::InsufficientStock { .. })))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
        assert_eq!(store.stock_of(product_id).await, Some(4));
    }
}
