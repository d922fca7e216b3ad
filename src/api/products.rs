//! Product catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use validator::Validate;

use crate::api::auth::AdminUser;
use crate::api::AppState;
use crate::domain::aggregates::{Category, Product};
use crate::error::{ApiError, ApiResult};
use crate::store::ObjectId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<Category>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<f64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_products: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

fn matches(p: &Product, params: &ListParams) -> bool {
    if let Some(category) = params.category {
        if p.category != category {
            return false;
        }
    }
    if let Some(brand) = &params.brand {
        if &p.brand != brand {
            return false;
        }
    }
    if let Some(min) = params.min_price {
        if p.price < min {
            return false;
        }
    }
    if let Some(max) = params.max_price {
        if p.price > max {
            return false;
        }
    }
    if let Some(min) = params.min_rating {
        if p.rating < min {
            return false;
        }
    }
    if let Some(search) = &params.search {
        let needle = search.to_lowercase();
        let hit = p.name.to_lowercase().contains(&needle)
            || p.description.to_lowercase().contains(&needle)
            || p.brand.to_lowercase().contains(&needle);
        if !hit {
            return false;
        }
    }
    true
}

/// GET /api/products. Filtered, sorted, paginated.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ProductListResponse>> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(12).clamp(1, 100);

    let mut products = state.db.products.find(|p| matches(p, &params)).await;

    let descending = params.sort_order.as_deref() != Some("asc");
    match params.sort_by.as_deref() {
        Some("price") => products.sort_by(|a, b| a.price.cmp(&b.price)),
        Some("rating") => {
            products.sort_by(|a, b| a.rating.partial_cmp(&b.rating).unwrap_or(std::cmp::Ordering::Equal))
        }
        _ => products.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
    if descending {
        products.reverse();
    }

    let total = products.len();
    let total_pages = ((total as u32) + limit - 1) / limit;
    let start = (page as usize - 1).saturating_mul(limit as usize);
    let products: Vec<Product> =
        products.into_iter().skip(start).take(limit as usize).collect();

    Ok(Json(ProductListResponse {
        products,
        pagination: Pagination {
            current_page: page,
            total_pages,
            total_products: total,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        },
    }))
}

/// GET /api/products/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Product>> {
    let id: ObjectId = id.parse().map_err(|_| ApiError::NotFound("Product"))?;
    let product =
        state.db.products.find_by_id(&id).await.ok_or(ApiError::NotFound("Product"))?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: String,
    pub images: Option<Vec<String>>,
    pub stock: u32,
    pub features: Option<Vec<String>>,
    pub specifications: Option<HashMap<String, String>>,
    #[validate(range(max = 100, message = "Discount must be between 0 and 100"))]
    pub discount: Option<u8>,
}

impl ProductInput {
    fn check(&self) -> ApiResult<()> {
        self.validate()?;
        if self.price < Decimal::ZERO {
            return Err(ApiError::validation("Price must be a positive number"));
        }
        Ok(())
    }
}

/// POST /api/products (admin).
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<ProductInput>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    input.check()?;
    let mut product = Product::new(
        input.name,
        input.description,
        input.price,
        input.category,
        input.brand,
        input.stock,
    );
    product.images = input.images.unwrap_or_default();
    product.features = input.features.unwrap_or_default();
    product.specifications = input.specifications.unwrap_or_default();
    product.discount = input.discount.unwrap_or(0);
    let product = state.db.products.insert(product).await;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/:id (admin). Derived rating fields are preserved.
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Json<Product>> {
    input.check()?;
    let id: ObjectId = id.parse().map_err(|_| ApiError::NotFound("Product"))?;
    let mut product =
        state.db.products.find_by_id(&id).await.ok_or(ApiError::NotFound("Product"))?;

    product.name = input.name;
    product.description = input.description;
    product.price = input.price;
    product.category = input.category;
    product.brand = input.brand;
    product.stock = input.stock;
    if let Some(images) = input.images {
        product.images = images;
    }
    if let Some(features) = input.features {
        product.features = features;
    }
    if let Some(specifications) = input.specifications {
        product.specifications = specifications;
    }
    if let Some(discount) = input.discount {
        product.discount = discount;
    }
    product.touch();

    let product = state.db.products.save(product).await;
    Ok(Json(product))
}

/// DELETE /api/products/:id (admin).
pub async fn remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id: ObjectId = id.parse().map_err(|_| ApiError::NotFound("Product"))?;
    if !state.db.products.delete(&id).await {
        return Err(ApiError::NotFound("Product"));
    }
    Ok(Json(json!({ "message": "Product removed" })))
}
