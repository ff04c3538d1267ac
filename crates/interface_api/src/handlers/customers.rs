//! Customer handlers
//!
//! Deleting a customer never touches invoice history - issued invoices
//! keep their frozen snapshot.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::CustomerId;
use domain_catalog::Customer;
use infra_db::CustomerRepository;

use crate::auth::Claims;
use crate::dto::catalog::{CreateCustomerRequest, CustomerResponse, UpdateCustomerRequest};
use crate::error::ApiError;
use crate::AppState;

/// Creates a customer
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let mut customer =
        Customer::new(owner_id, request.name).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    customer.email = request.email;
    customer.phone = request.phone;
    customer.address = request.address;
    customer.tax_id = request.tax_id;

    CustomerRepository::new(state.pool.clone())
        .insert(&customer)
        .await?;

    Ok(Json(CustomerResponse::from(customer)))
}

/// Lists the owner's customers
pub async fn list_customers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let customers = CustomerRepository::new(state.pool.clone())
        .list(owner_id)
        .await?;

    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// Gets a customer by id
pub async fn get_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let customer = CustomerRepository::new(state.pool.clone())
        .get(owner_id, CustomerId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Customer {id} not found")))?;

    Ok(Json(CustomerResponse::from(customer)))
}

/// Updates a customer's contact fields
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let repository = CustomerRepository::new(state.pool.clone());
    let mut customer = repository
        .get(owner_id, CustomerId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Customer {id} not found")))?;

    customer.name = request.name;
    customer.email = request.email;
    customer.phone = request.phone;
    customer.address = request.address;
    customer.tax_id = request.tax_id;

    let changed = repository.update(&customer).await?;
    if changed == 0 {
        return Err(ApiError::NotFound(format!("Customer {id} not found")));
    }

    Ok(Json(CustomerResponse::from(customer)))
}

/// Deletes a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let deleted = CustomerRepository::new(state.pool.clone())
        .delete(owner_id, CustomerId::from_uuid(id))
        .await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("Customer {id} not found")));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
