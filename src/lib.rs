//! Storefront API
//!
//! REST backend for a conventional e-commerce storefront.
//!
//! ## Features
//! - Product catalog with filtering, search and pagination
//! - Per-user cart with price-snapshot line items and stock checks
//! - Checkout into immutable orders with a validated fulfillment state machine
//! - Reviews with derived product rating aggregation
//! - Wishlist with a move-to-cart bridge

pub mod api;
pub mod domain;
pub mod error;
pub mod store;
