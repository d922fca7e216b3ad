//! Review endpoints.
//!
//! Every write is followed by a full recompute of the owning product's
//! rating/review count within the same request.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::api::auth::AuthUser;
use crate::api::AppState;
use crate::domain::aggregates::{OrderStatus, Review, ReviewError};
use crate::error::{ApiError, ApiResult};
use crate::store::ObjectId;

/// Reloads all reviews for the product and rewrites the derived fields.
/// A product deleted mid-flight is ignored.
async fn refresh_product_rating(state: &AppState, product_id: &ObjectId) {
    let reviews = state.db.reviews.find(|r| &r.product == product_id).await;
    let ratings: Vec<u8> = reviews.iter().map(|r| r.rating).collect();
    if let Some(mut product) = state.db.products.find_by_id(product_id).await {
        product.apply_ratings(&ratings);
        state.db.products.save(product).await;
    }
}

async fn find_review(state: &AppState, id: &str) -> ApiResult<Review> {
    let id: ObjectId = id.parse().map_err(|_| ApiError::NotFound("Review"))?;
    state.db.reviews.find_by_id(&id).await.ok_or(ApiError::NotFound("Review"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucket {
    pub rating: u8,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListResponse {
    pub reviews: Vec<Review>,
    pub total_pages: u32,
    pub current_page: u32,
    pub total: usize,
    pub rating_distribution: Vec<RatingBucket>,
}

/// GET /api/reviews/product/:productId. Public.
pub async fn list_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ReviewListResponse>> {
    let product_id: ObjectId =
        product_id.parse().map_err(|_| ApiError::NotFound("Product"))?;
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);

    let mut reviews = state.db.reviews.find(|r| r.product == product_id).await;

    let descending = params.sort_order.as_deref() != Some("asc");
    match params.sort_by.as_deref() {
        Some("rating") => reviews.sort_by_key(|r| r.rating),
        _ => reviews.sort_by_key(|r| r.created_at),
    }
    if descending {
        reviews.reverse();
    }

    let total = reviews.len();
    let rating_distribution = (1..=5)
        .map(|rating| RatingBucket {
            rating,
            count: reviews.iter().filter(|r| r.rating == rating).count(),
        })
        .collect();

    let start = (page as usize - 1).saturating_mul(limit as usize);
    let reviews: Vec<Review> = reviews.into_iter().skip(start).take(limit as usize).collect();

    Ok(Json(ReviewListResponse {
        reviews,
        total_pages: ((total as u32) + limit - 1) / limit,
        current_page: page,
        total,
        rating_distribution,
    }))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub product: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
    #[validate(length(min = 10, max = 500, message = "Comment must be between 10 and 500 characters"))]
    pub comment: String,
}

/// POST /api/reviews. One review per (product, user).
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    req.validate()?;
    let product_id: ObjectId =
        req.product.parse().map_err(|_| ApiError::validation("Invalid product ID"))?;
    state
        .db
        .products
        .find_by_id(&product_id)
        .await
        .ok_or(ApiError::NotFound("Product"))?;

    let duplicate = state
        .db
        .reviews
        .find_one(|r| r.product == product_id && r.user == user.id)
        .await;
    if duplicate.is_some() {
        return Err(ApiError::validation("You have already reviewed this product"));
    }

    // Verified means the author has a delivered order containing the product.
    let verified = state
        .db
        .orders
        .find_one(|o| {
            o.user == user.id
                && o.status == OrderStatus::Delivered
                && o.items.iter().any(|i| i.product == product_id)
        })
        .await
        .is_some();

    let review = Review::new(product_id.clone(), user.id.clone(), req.rating, req.comment, verified);
    let review = state.db.reviews.insert(review).await;
    refresh_product_rating(&state, &product_id).await;

    Ok((StatusCode::CREATED, Json(review)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<u8>,
    #[validate(length(min = 10, max = 500, message = "Comment must be between 10 and 500 characters"))]
    pub comment: Option<String>,
}

/// PUT /api/reviews/:reviewId. Author only.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(review_id): Path<String>,
    Json(req): Json<UpdateReviewRequest>,
) -> ApiResult<Json<Review>> {
    req.validate()?;
    let mut review = find_review(&state, &review_id).await?;
    if review.user != user.id {
        return Err(ApiError::Forbidden("Not authorized to update this review".into()));
    }
    review.edit(req.rating, req.comment);
    let review = state.db.reviews.save(review).await;
    refresh_product_rating(&state, &review.product).await;
    Ok(Json(review))
}

/// DELETE /api/reviews/:reviewId. Author or admin.
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(review_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let review = find_review(&state, &review_id).await?;
    if review.user != user.id && !user.is_admin() {
        return Err(ApiError::Forbidden("Not authorized to delete this review".into()));
    }
    state.db.reviews.delete(&review.id).await;
    refresh_product_rating(&state, &review.product).await;
    Ok(Json(json!({ "message": "Review deleted successfully" })))
}

/// POST /api/reviews/:reviewId/helpful. Toggles the caller's mark.
pub async fn toggle_helpful(
    State(state): State<AppState>,
    user: AuthUser,
    Path(review_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut review = find_review(&state, &review_id).await?;
    let marked = review.toggle_helpful(&user.id);
    let review = state.db.reviews.save(review).await;
    Ok(Json(json!({
        "message": if marked { "Review marked as helpful" } else { "Helpful mark removed" },
        "helpfulCount": review.helpful.len(),
    })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReportRequest {
    #[validate(length(min = 1, max = 200, message = "Reason is required and must be less than 200 characters"))]
    pub reason: String,
}

/// POST /api/reviews/:reviewId/report. Once per user.
pub async fn report(
    State(state): State<AppState>,
    user: AuthUser,
    Path(review_id): Path<String>,
    Json(req): Json<ReportRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate()?;
    let mut review = find_review(&state, &review_id).await?;
    review.report(user.id.clone(), req.reason).map_err(|e| match e {
        ReviewError::AlreadyReported => ApiError::validation(e.to_string()),
    })?;
    state.db.reviews.save(review).await;
    Ok(Json(json!({ "message": "Review reported successfully" })))
}
