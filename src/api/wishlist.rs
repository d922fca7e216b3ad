//! Wishlist endpoints, including the move-to-cart bridge.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::auth::AuthUser;
use crate::api::cart::{populate as populate_cart, CartView};
use crate::api::AppState;
use crate::domain::aggregates::{Cart, Product, Wishlist, WishlistError};
use crate::error::{ApiError, ApiResult};
use crate::store::ObjectId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    pub id: ObjectId,
    pub user: ObjectId,
    pub products: Vec<WishlistEntryView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntryView {
    pub product: Option<Product>,
    pub added_at: DateTime<Utc>,
}

async fn populate(state: &AppState, wishlist: Wishlist) -> WishlistView {
    let mut products = Vec::with_capacity(wishlist.products.len());
    for entry in &wishlist.products {
        let product = state.db.products.find_by_id(&entry.product).await;
        products.push(WishlistEntryView { product, added_at: entry.added_at });
    }
    WishlistView {
        id: wishlist.id.clone(),
        user: wishlist.user.clone(),
        products,
        created_at: wishlist.created_at,
        updated_at: wishlist.updated_at,
    }
}

async fn load_wishlist(state: &AppState, user: &AuthUser) -> ApiResult<Wishlist> {
    state
        .db
        .wishlists
        .find_one(|w| w.user == user.id)
        .await
        .ok_or(ApiError::NotFound("Wishlist"))
}

/// GET /api/wishlist. Lazily creates an empty wishlist on first read.
pub async fn get(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<WishlistView>> {
    let wishlist = match state.db.wishlists.find_one(|w| w.user == user.id).await {
        Some(wishlist) => wishlist,
        None => state.db.wishlists.insert(Wishlist::new(user.id.clone())).await,
    };
    Ok(Json(populate(&state, wishlist).await))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub product_id: String,
}

/// POST /api/wishlist/add
pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AddRequest>,
) -> ApiResult<(StatusCode, Json<WishlistView>)> {
    let product_id: ObjectId =
        req.product_id.parse().map_err(|_| ApiError::NotFound("Product"))?;
    state
        .db
        .products
        .find_by_id(&product_id)
        .await
        .ok_or(ApiError::NotFound("Product"))?;

    let mut wishlist = state
        .db
        .wishlists
        .find_one(|w| w.user == user.id)
        .await
        .unwrap_or_else(|| Wishlist::new(user.id.clone()));

    wishlist.add(product_id).map_err(|e| match e {
        WishlistError::AlreadyPresent => ApiError::validation(e.to_string()),
    })?;
    let wishlist = state.db.wishlists.save(wishlist).await;
    Ok((StatusCode::CREATED, Json(populate(&state, wishlist).await)))
}

/// DELETE /api/wishlist/remove/:productId
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<String>,
) -> ApiResult<Json<WishlistView>> {
    let product_id: ObjectId =
        product_id.parse().map_err(|_| ApiError::NotFound("Product"))?;
    let mut wishlist = load_wishlist(&state, &user).await?;
    if !wishlist.remove(&product_id) {
        return Err(ApiError::NotFound("Product"));
    }
    let wishlist = state.db.wishlists.save(wishlist).await;
    Ok(Json(populate(&state, wishlist).await))
}

/// DELETE /api/wishlist/clear
pub async fn clear(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<serde_json::Value>> {
    if let Some(mut wishlist) = state.db.wishlists.find_one(|w| w.user == user.id).await {
        wishlist.clear();
        state.db.wishlists.save(wishlist).await;
    }
    Ok(Json(json!({ "message": "Wishlist cleared successfully" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToCartRequest {
    pub product_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToCartResponse {
    pub moved: Vec<ObjectId>,
    /// Products left in the wishlist because they are gone from the catalog
    /// or out of stock.
    pub skipped: Vec<ObjectId>,
    pub cart: CartView,
    pub wishlist: WishlistView,
}

/// POST /api/wishlist/move-to-cart
///
/// Each requested product still in the wishlist is added to the cart
/// (quantity 1, current price snapshot, stock-checked) and removed from the
/// wishlist. Products that fail the stock check stay put.
pub async fn move_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<MoveToCartRequest>,
) -> ApiResult<Json<MoveToCartResponse>> {
    let mut wishlist = load_wishlist(&state, &user).await?;
    let mut cart = state
        .db
        .carts
        .find_one(|c| c.user == user.id)
        .await
        .unwrap_or_else(|| Cart::new(user.id.clone()));

    let mut moved = Vec::new();
    let mut skipped = Vec::new();
    for raw in &req.product_ids {
        let Ok(product_id) = raw.parse::<ObjectId>() else { continue };
        if !wishlist.contains(&product_id) {
            continue;
        }
        let product = state.db.products.find_by_id(&product_id).await;
        let in_cart = cart.line_for_product(&product_id).map(|l| l.quantity).unwrap_or(0);
        match product {
            Some(product) if product.has_stock(in_cart.saturating_add(1)) => {
                cart.add_item(product_id.clone(), 1, product.price);
                wishlist.remove(&product_id);
                moved.push(product_id);
            }
            _ => skipped.push(product_id),
        }
    }

    let cart = state.db.carts.save(cart).await;
    let wishlist = state.db.wishlists.save(wishlist).await;
    Ok(Json(MoveToCartResponse {
        moved,
        skipped,
        cart: populate_cart(&state, cart).await,
        wishlist: populate(&state, wishlist).await,
    }))
}
