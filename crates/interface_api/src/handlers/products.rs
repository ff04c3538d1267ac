//! Product handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Money, ProductId, TaxRate};
use domain_catalog::Product;
use infra_db::ProductRepository;

use crate::auth::Claims;
use crate::dto::catalog::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use crate::error::ApiError;
use crate::AppState;

/// Creates a product
pub async fn create_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let tax_rate =
        TaxRate::new(request.tax_rate).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let mut product = Product::new(
        owner_id,
        request.name,
        request.sku,
        Money::new(request.price),
        tax_rate,
        request.stock,
    )
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if let Some(threshold) = request.low_stock_threshold {
        product = product.with_low_stock_threshold(threshold);
    }

    ProductRepository::new(state.pool.clone())
        .insert(&product)
        .await?;

    Ok(Json(ProductResponse::from(product)))
}

/// Lists the owner's products
pub async fn list_products(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let products = ProductRepository::new(state.pool.clone())
        .list(owner_id)
        .await?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Lists products at or below their low-stock threshold
pub async fn list_low_stock(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let products = ProductRepository::new(state.pool.clone())
        .find_low_stock(owner_id)
        .await?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Gets a product by id
pub async fn get_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, ApiError> {
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let product = ProductRepository::new(state.pool.clone())
        .get(owner_id, ProductId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;

    Ok(Json(ProductResponse::from(product)))
}

/// Updates a product
pub async fn update_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;
    if request.stock < 0 {
        return Err(ApiError::BadRequest(
            "stock must not be negative".to_string(),
        ));
    }

    let repository = ProductRepository::new(state.pool.clone());
    let mut product = repository
        .get(owner_id, ProductId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;

    product.name = request.name;
    product.sku = request.sku;
    product.unit_price = Money::new(request.price);
    if product.unit_price.is_negative() {
        return Err(ApiError::BadRequest(
            "price must not be negative".to_string(),
        ));
    }
    product.tax_rate =
        TaxRate::new(request.tax_rate).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    product.stock = request.stock;
    if let Some(threshold) = request.low_stock_threshold {
        product.low_stock_threshold = threshold;
    }

    let changed = repository.update(&product).await?;
    if changed == 0 {
        return Err(ApiError::NotFound(format!("Product {id} not found")));
    }

    Ok(Json(ProductResponse::from(product)))
}

/// Deletes a product
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner_id = claims.owner_id().map_err(|_| ApiError::Unauthorized)?;

    let deleted = ProductRepository::new(state.pool.clone())
        .delete(owner_id, ProductId::from_uuid(id))
        .await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("Product {id} not found")));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
