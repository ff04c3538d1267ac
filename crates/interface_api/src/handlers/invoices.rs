//! Invoice handlers
//!
//! The create and void endpoints are thin shells around the transaction
//! coordinators; everything stateful happens inside one database
//! transaction there. Reads go through the invoice repository.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use domain_billing::{InvoiceCoordinator, InvoiceRef, VoidCoordinator};
use infra_db::{InvoiceRepository, PgBillingStore};

use crate::auth::Claims;
use crate::dto::billing::{CreateInvoiceRequest, InvoiceResponse, VoidResponse};
use crate::error::ApiError;
use crate::AppState;

/// Creates an invoice
pub async fn create_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let coordinator = InvoiceCoordinator::new(PgBillingStore::new(state.pool.clone()));
    let invoice = coordinator
        .create_invoice(owner_id, request.into_domain())
        .await?;

    Ok(Json(InvoiceResponse::from(invoice)))
}

/// Lists the owner's invoices, newest first
pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let invoices = InvoiceRepository::new(state.pool.clone())
        .list(owner_id)
        .await?;

    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}

/// Gets an invoice by id or invoice number
pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(reference): Path<String>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;
    let reference = InvoiceRef::parse(&reference);

    let invoice = InvoiceRepository::new(state.pool.clone())
        .get(owner_id, &reference)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Invoice {reference} not found")))?;

    Ok(Json(InvoiceResponse::from(invoice)))
}

/// Voids an invoice: restores stock from the stored snapshots and removes
/// the row, atomically
pub async fn void_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(reference): Path<String>,
) -> Result<Json<VoidResponse>, ApiError> {
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;
    let reference = InvoiceRef::parse(&reference);

    let coordinator = VoidCoordinator::new(PgBillingStore::new(state.pool.clone()));
    let outcome = coordinator.void_invoice(owner_id, &reference).await?;

    Ok(Json(VoidResponse {
        success: true,
        invoice_number: outcome.invoice.invoice_number,
        skipped_products: outcome
            .skipped_products
            .into_iter()
            .map(Uuid::from)
            .collect(),
    }))
}
