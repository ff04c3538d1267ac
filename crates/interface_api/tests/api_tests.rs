//! API layer tests
//!
//! DTO validation and mapping tests, plus router-level smoke tests over a
//! lazily-connected pool (the public routes never touch the database).

use axum_test::TestServer;
use rust_decimal_macros::dec;
use sqlx::postgres::PgPoolOptions;
use validator::Validate;

use domain_billing::{Discount, DiscountKind};
use interface_api::config::ApiConfig;
use interface_api::create_router;
use interface_api::dto::billing::{CreateInvoiceRequest, InvoiceResponse};
use test_utils::{
    assert_invoice_totals_consistent, CustomerBuilder, InvoiceBuilder, ProductBuilder,
};

fn parse_request(json: &str) -> CreateInvoiceRequest {
    serde_json::from_str(json).expect("request must deserialize")
}

#[test]
fn create_request_minimal_body() {
    let request = parse_request(
        r#"{
            "items": [
                {"product_id": "018e2a30-0000-7000-8000-000000000001", "quantity": 2}
            ]
        }"#,
    );

    assert!(request.validate().is_ok());

    let domain = request.into_domain();
    assert_eq!(domain.items.len(), 1);
    assert_eq!(domain.items[0].quantity, 2);
    assert!(domain.invoice_number.is_none());
    assert!(domain.customer_id.is_none());
    assert!(domain.discount.is_none());
    assert_eq!(domain.payment_method, "Cash");
}

#[test]
fn create_request_full_body() {
    let request = parse_request(
        r#"{
            "invoice_number": "INV-CUSTOM-7",
            "customer_id": "018e2a30-0000-7000-8000-000000000002",
            "items": [
                {"product_id": "018e2a30-0000-7000-8000-000000000001", "quantity": 1}
            ],
            "discount": {"kind": "percentage", "value": "12.5"},
            "payment_method": "Card",
            "date": "2024-03-07T10:30:00Z"
        }"#,
    );

    assert!(request.validate().is_ok());

    let domain = request.into_domain();
    assert_eq!(domain.invoice_number.as_deref(), Some("INV-CUSTOM-7"));
    assert!(domain.customer_id.is_some());
    assert_eq!(domain.discount, Discount::percentage(dec!(12.5)));
    assert_eq!(domain.payment_method, "Card");
    assert!(domain.issued_at.is_some());
}

#[test]
fn empty_items_fail_validation() {
    let request = parse_request(r#"{"items": []}"#);
    assert!(request.validate().is_err());
}

#[test]
fn zero_quantity_fails_validation() {
    let request = parse_request(
        r#"{
            "items": [
                {"product_id": "018e2a30-0000-7000-8000-000000000001", "quantity": 0}
            ]
        }"#,
    );
    assert!(request.validate().is_err());
}

#[test]
fn negative_quantity_is_unrepresentable() {
    let result: Result<CreateInvoiceRequest, _> = serde_json::from_str(
        r#"{
            "items": [
                {"product_id": "018e2a30-0000-7000-8000-000000000001", "quantity": -3}
            ]
        }"#,
    );
    assert!(result.is_err());
}

#[test]
fn request_has_no_price_override_field() {
    // caller-supplied prices are untrusted by design; the field does not exist
    let result: Result<CreateInvoiceRequest, _> = serde_json::from_str(
        r#"{
            "items": [
                {"product_id": "018e2a30-0000-7000-8000-000000000001", "quantity": 1, "price": "0.01"}
            ]
        }"#,
    );
    // unknown fields are ignored, not honored
    let request = result.expect("extra fields are dropped");
    let domain = request.into_domain();
    assert_eq!(domain.items[0].quantity, 1);
}

#[test]
fn invoice_response_mapping_keeps_totals() {
    let owner = test_utils::IdFixtures::owner_id();
    let customer = CustomerBuilder::new()
        .with_owner(owner)
        .with_email("orders@acme.example")
        .build();
    let invoice = InvoiceBuilder::new()
        .with_owner(owner)
        .with_customer(customer)
        .with_line(
            ProductBuilder::new()
                .with_owner(owner)
                .with_price(dec!(100))
                .with_tax_rate(dec!(18))
                .build(),
            2,
        )
        .with_discount(Discount::flat(dec!(36)))
        .build();
    assert_invoice_totals_consistent(&invoice);

    let response = InvoiceResponse::from(invoice.clone());

    assert_eq!(response.invoice_number, invoice.invoice_number);
    assert_eq!(response.total_amount, dec!(200));
    assert_eq!(response.items.len(), 1);
    assert_eq!(response.items[0].subtotal, dec!(200));
    assert_eq!(response.items[0].tax_amount, dec!(36));
    assert_eq!(response.items[0].line_total, dec!(236));
    assert!(matches!(response.discount.kind, DiscountKind::Flat));
    assert_eq!(
        response.customer_snapshot.as_ref().unwrap().email.as_deref(),
        Some("orders@acme.example")
    );

    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("invoice_number").is_some());
    assert!(json.get("items").is_some());
    assert!(json.get("total_amount").is_some());
}

fn test_server() -> TestServer {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/billing_test")
        .expect("lazy pool");
    let app = create_router(pool, ApiConfig::default());
    TestServer::new(app).expect("test server")
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let server = test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn api_routes_require_bearer_token() {
    let server = test_server();
    let response = server.get("/api/v1/invoices").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let server = test_server();
    let response = server
        .get("/api/v1/products")
        .add_header(
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderValue::from_static("Bearer not-a-real-token"),
        )
        .await;
    response.assert_status_unauthorized();
}
