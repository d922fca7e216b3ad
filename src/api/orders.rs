//! Order endpoints: checkout, history, payment and fulfillment transitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::auth::{AdminUser, AuthUser};
use crate::api::AppState;
use crate::domain::aggregates::{
    Order, OrderItem, OrderStatus, PaymentMethod, PriceBreakdown, ShippingAddress,
};
use crate::error::{ApiError, ApiResult};
use crate::store::ObjectId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product: String,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Option<Vec<OrderItemInput>>,
    pub shipping_address: ShippingAddress,
    pub payment_method: Option<String>,
    pub total_amount: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
}

async fn find_order(state: &AppState, id: &str) -> ApiResult<Order> {
    let id: ObjectId = id.parse().map_err(|_| ApiError::NotFound("Order"))?;
    state.db.orders.find_by_id(&id).await.ok_or(ApiError::NotFound("Order"))
}

/// POST /api/orders. Checkout.
///
/// With an explicit item list the client's totals win; otherwise the live
/// cart is snapshotted and priced (18% tax, flat shipping below the
/// free-shipping threshold). Either way the user's cart is cleared before
/// the response goes out.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let payment_method = match req.payment_method.as_deref() {
        Some("razorpay") => PaymentMethod::Razorpay,
        _ => PaymentMethod::CashOnDelivery,
    };

    let (items, pricing) = match req.items {
        Some(inputs) if !inputs.is_empty() => {
            let mut items = Vec::with_capacity(inputs.len());
            for input in inputs {
                let product: ObjectId = input
                    .product
                    .parse()
                    .map_err(|_| ApiError::validation("Invalid product ID"))?;
                items.push(OrderItem {
                    product,
                    name: input.name,
                    quantity: input.quantity,
                    price: input.price,
                    image: input.image,
                });
            }
            let items_price = items
                .iter()
                .fold(Decimal::ZERO, |acc, i| acc + i.price * Decimal::from(i.quantity));
            let pricing = PriceBreakdown::from_client(items_price, req.tax_amount, req.total_amount);
            (items, pricing)
        }
        _ => {
            let cart = state.db.carts.find_one(|c| c.user == user.id).await;
            let cart = match cart {
                Some(cart) if !cart.is_empty() => cart,
                _ => return Err(ApiError::validation("Cart is empty")),
            };
            let mut items = Vec::with_capacity(cart.items.len());
            for line in &cart.items {
                let product = state
                    .db
                    .products
                    .find_by_id(&line.product)
                    .await
                    .ok_or(ApiError::NotFound("Product"))?;
                items.push(OrderItem {
                    product: product.id.clone(),
                    name: product.name.clone(),
                    quantity: line.quantity,
                    price: line.price,
                    image: product.images.first().cloned(),
                });
            }
            let pricing = PriceBreakdown::from_cart_total(cart.total());
            (items, pricing)
        }
    };

    let order = Order::place(user.id.clone(), items, req.shipping_address, payment_method, pricing);
    let order = state.db.orders.insert(order).await;

    // Clear the cart in the same unit of work; the response is not sent
    // until both writes have landed.
    if let Some(mut cart) = state.db.carts.find_one(|c| c.user == user.id).await {
        cart.clear();
        state.db.carts.save(cart).await;
    }

    tracing::info!(order_id = %order.id, user = %order.user, total = %order.total_price, "order placed");
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/myorders. Newest first.
pub async fn mine(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Order>>> {
    let mut orders = state.db.orders.find(|o| o.user == user.id).await;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(orders))
}

/// GET /api/orders (admin). Newest first.
pub async fn list_all(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<Order>>> {
    let mut orders = state.db.orders.all().await;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(orders))
}

/// GET /api/orders/:id. Owner or admin only.
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    let order = find_order(&state, &id).await?;
    if order.user != user.id && !user.is_admin() {
        return Err(ApiError::Unauthorized);
    }
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    pub payment_result: serde_json::Value,
}

/// PUT /api/orders/:id/pay. Records the gateway result; status unchanged.
pub async fn pay(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<PayRequest>,
) -> ApiResult<Json<Order>> {
    let mut order = find_order(&state, &id).await?;
    order.mark_paid(req.payment_result);
    let order = state.db.orders.save(order).await;
    Ok(Json(order))
}

/// PUT /api/orders/:id/deliver (admin).
pub async fn deliver(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    let mut order = find_order(&state, &id).await?;
    order.deliver().map_err(|e| ApiError::validation(e.to_string()))?;
    let order = state.db.orders.save(order).await;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// PUT /api/orders/:id/status (admin). The requested status must name a
/// known state and the move must be legal per the transition table.
pub async fn set_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<Order>> {
    let next: OrderStatus = req
        .status
        .parse()
        .map_err(|_| ApiError::validation(format!("Unknown status '{}'", req.status)))?;
    let mut order = find_order(&state, &id).await?;
    order.set_status(next).map_err(|e| ApiError::validation(e.to_string()))?;
    let order = state.db.orders.save(order).await;
    Ok(Json(order))
}

/// PUT /api/orders/:id/cancel. Owner only, from Pending or Processing.
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    let mut order = find_order(&state, &id).await?;
    if order.user != user.id {
        return Err(ApiError::Unauthorized);
    }
    order.cancel().map_err(|e| ApiError::validation(e.to_string()))?;
    let order = state.db.orders.save(order).await;
    Ok(Json(order))
}
