//! Aggregates module
pub mod cart;
pub mod order;
pub mod product;
pub mod review;
pub mod wishlist;

pub use cart::{Cart, CartError, CartLine};
pub use order::{
    Order, OrderError, OrderItem, OrderStatus, PaymentMethod, PriceBreakdown, ShippingAddress,
};
pub use product::{Category, Product};
pub use review::{Review, ReviewError, ReviewReport};
pub use wishlist::{Wishlist, WishlistEntry, WishlistError};
