//! REST surface.

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::Db;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Db>,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "storefront-api" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/:id",
            get(products::get).put(products::update).delete(products::remove),
        )
        .route("/api/cart", get(cart::get))
        .route("/api/cart/add", post(cart::add))
        .route("/api/cart/update/:itemId", put(cart::update))
        .route("/api/cart/remove/:itemId", delete(cart::remove))
        .route("/api/cart/clear", delete(cart::clear))
        .route("/api/orders", post(orders::create).get(orders::list_all))
        .route("/api/orders/myorders", get(orders::mine))
        .route("/api/orders/:id", get(orders::get))
        .route("/api/orders/:id/pay", put(orders::pay))
        .route("/api/orders/:id/deliver", put(orders::deliver))
        .route("/api/orders/:id/status", put(orders::set_status))
        .route("/api/orders/:id/cancel", put(orders::cancel))
        .route("/api/wishlist", get(wishlist::get))
        .route("/api/wishlist/add", post(wishlist::add))
        .route("/api/wishlist/remove/:productId", delete(wishlist::remove))
        .route("/api/wishlist/clear", delete(wishlist::clear))
        .route("/api/wishlist/move-to-cart", post(wishlist::move_to_cart))
        .route("/api/reviews", post(reviews::create))
        .route("/api/reviews/product/:productId", get(reviews::list_for_product))
        .route(
            "/api/reviews/:reviewId",
            put(reviews::update).delete(reviews::remove),
        )
        .route("/api/reviews/:reviewId/helpful", post(reviews::toggle_helpful))
        .route("/api/reviews/:reviewId/report", post(reviews::report))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
