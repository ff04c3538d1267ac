//! Tests for catalog entities

use core_kernel::{Money, OwnerId, TaxRate};
use domain_catalog::{Customer, CustomerSnapshot, Product};
use rust_decimal_macros::dec;

fn widget(owner: OwnerId, stock: i64) -> Product {
    Product::new(
        owner,
        "Widget",
        "WID-100",
        Money::new(dec!(49.50)),
        TaxRate::new(dec!(12)).unwrap(),
        stock,
    )
    .unwrap()
}

#[test]
fn product_serde_round_trip() {
    let product = widget(OwnerId::new(), 7);
    let json = serde_json::to_string(&product).unwrap();
    let back: Product = serde_json::from_str(&json).unwrap();

    assert_eq!(back.id, product.id);
    assert_eq!(back.sku, product.sku);
    assert_eq!(back.unit_price, product.unit_price);
    assert_eq!(back.stock, 7);
}

#[test]
fn product_owner_scoping_is_explicit() {
    let owner = OwnerId::new();
    let product = widget(owner, 1);
    assert_eq!(product.owner_id, owner);
}

#[test]
fn zero_stock_product_is_valid_but_unsellable() {
    let product = widget(OwnerId::new(), 0);
    assert!(product.is_low_stock());
    assert!(!product.has_stock(1));
    assert!(product.has_stock(0));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn has_stock_matches_comparison(stock in 0i64..1_000_000i64, requested in 0u32..1000u32) {
            let product = widget(OwnerId::new(), stock);
            prop_assert_eq!(product.has_stock(requested), stock >= i64::from(requested));
        }

        #[test]
        fn low_stock_matches_threshold(stock in 0i64..100i64) {
            let product = widget(OwnerId::new(), stock);
            prop_assert_eq!(product.is_low_stock(), stock <= product.low_stock_threshold);
        }
    }
}

#[test]
fn customer_snapshot_serde_round_trip() {
    let customer = Customer::new(OwnerId::new(), "Road Runner Supplies")
        .unwrap()
        .with_email("rr@example.com");
    let snapshot = CustomerSnapshot::from(&customer);

    let json = serde_json::to_string(&snapshot).unwrap();
    let back: CustomerSnapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(back, snapshot);
}
