//! Cart endpoints.
//!
//! Every mutating operation returns the full cart with product references
//! resolved for the client to render.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::auth::AuthUser;
use crate::api::AppState;
use crate::domain::aggregates::{Cart, CartError, Product};
use crate::error::{ApiError, ApiResult};
use crate::store::ObjectId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: ObjectId,
    pub user: ObjectId,
    pub items: Vec<CartLineView>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub id: ObjectId,
    /// None if the product has since been removed from the catalog.
    pub product: Option<Product>,
    pub quantity: u32,
    pub price: Decimal,
}

pub(crate) async fn populate(state: &AppState, cart: Cart) -> CartView {
    let mut items = Vec::with_capacity(cart.items.len());
    for line in &cart.items {
        let product = state.db.products.find_by_id(&line.product).await;
        items.push(CartLineView {
            id: line.id.clone(),
            product,
            quantity: line.quantity,
            price: line.price,
        });
    }
    CartView {
        id: cart.id.clone(),
        user: cart.user.clone(),
        total: cart.total(),
        items,
        created_at: cart.created_at,
        updated_at: cart.updated_at,
    }
}

async fn load_cart(state: &AppState, user: &AuthUser) -> ApiResult<Cart> {
    state
        .db
        .carts
        .find_one(|c| c.user == user.id)
        .await
        .ok_or(ApiError::NotFound("Cart"))
}

/// GET /api/cart. Lazily creates an empty cart on first read.
pub async fn get(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<CartView>> {
    let cart = match state.db.carts.find_one(|c| c.user == user.id).await {
        Some(cart) => cart,
        None => state.db.carts.insert(Cart::new(user.id.clone())).await,
    };
    Ok(Json(populate(&state, cart).await))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// POST /api/cart/add
pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<Json<CartView>> {
    let quantity = req.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(ApiError::validation("Quantity must be at least 1"));
    }
    let product_id: ObjectId =
        req.product_id.parse().map_err(|_| ApiError::NotFound("Product"))?;
    let product = state
        .db
        .products
        .find_by_id(&product_id)
        .await
        .ok_or(ApiError::NotFound("Product"))?;

    let mut cart = state
        .db
        .carts
        .find_one(|c| c.user == user.id)
        .await
        .unwrap_or_else(|| Cart::new(user.id.clone()));

    // Stock is checked against the resulting line quantity, so repeated
    // small additions cannot run past stock. Overflow of the running
    // quantity necessarily exceeds any stock.
    let in_cart = cart.line_for_product(&product_id).map(|l| l.quantity).unwrap_or(0);
    let resulting = in_cart.checked_add(quantity);
    if !resulting.is_some_and(|total| product.has_stock(total)) {
        return Err(ApiError::validation("Insufficient stock"));
    }

    cart.add_item(product_id, quantity, product.price);
    let cart = state.db.carts.save(cart).await;
    Ok(Json(populate(&state, cart).await))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// PUT /api/cart/update/:itemId
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<Json<CartView>> {
    if req.quantity < 1 {
        return Err(ApiError::validation("Quantity must be at least 1"));
    }
    let item_id: ObjectId = item_id.parse().map_err(|_| ApiError::NotFound("Item"))?;
    let mut cart = load_cart(&state, &user).await?;
    let product_id = cart.line(&item_id).ok_or(ApiError::NotFound("Item"))?.product.clone();
    let product = state
        .db
        .products
        .find_by_id(&product_id)
        .await
        .ok_or(ApiError::NotFound("Product"))?;
    if !product.has_stock(req.quantity) {
        return Err(ApiError::validation("Insufficient stock"));
    }

    cart.set_quantity(&item_id, req.quantity).map_err(|e| match e {
        CartError::ItemNotFound => ApiError::NotFound("Item"),
    })?;
    let cart = state.db.carts.save(cart).await;
    Ok(Json(populate(&state, cart).await))
}

/// DELETE /api/cart/remove/:itemId. Silent if the line is already gone.
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<String>,
) -> ApiResult<Json<CartView>> {
    let item_id: ObjectId = item_id.parse().map_err(|_| ApiError::NotFound("Item"))?;
    let mut cart = load_cart(&state, &user).await?;
    cart.remove_item(&item_id);
    let cart = state.db.carts.save(cart).await;
    Ok(Json(populate(&state, cart).await))
}

/// DELETE /api/cart/clear
pub async fn clear(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<CartView>> {
    let mut cart = load_cart(&state, &user).await?;
    cart.clear();
    let cart = state.db.carts.save(cart).await;
    Ok(Json(populate(&state, cart).await))
}
