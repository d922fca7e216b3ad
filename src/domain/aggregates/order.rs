//! Order document and fulfillment state machine.
//!
//! An order freezes a line-item snapshot (name, price, image copied at
//! creation) together with the computed price breakdown. Status moves only
//! through the transition table below; `is_paid` is an orthogonal flag that
//! never moves status by itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::store::{Document, ObjectId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Forward-only transition table. Delivered and Cancelled are terminal;
    /// cancellation itself is further restricted by [`Order::cancel`].
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing | Shipped | Delivered | Cancelled)
                | (Processing, Shipped | Delivered | Cancelled)
                | (Shipped, Delivered)
        )
    }

    pub fn is_cancellable(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
    Razorpay,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
}

/// Frozen at order creation, never re-derived from the live product.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: ObjectId,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub image: Option<String>,
}

/// Computed checkout totals. Tax is always 18% of the items price unless the
/// client supplied its own tax amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
}

const TAX_RATE_PERCENT: i64 = 18;
const FREE_SHIPPING_THRESHOLD: i64 = 1000;
const FLAT_SHIPPING: i64 = 100;

fn tax_on(items_price: Decimal) -> Decimal {
    items_price * Decimal::from(TAX_RATE_PERCENT) / Decimal::from(100)
}

impl PriceBreakdown {
    /// Cart-derived checkout: flat shipping below the free-shipping threshold.
    pub fn from_cart_total(items_price: Decimal) -> Self {
        let tax_price = tax_on(items_price);
        let shipping_price = if items_price > Decimal::from(FREE_SHIPPING_THRESHOLD) {
            Decimal::ZERO
        } else {
            Decimal::from(FLAT_SHIPPING)
        };
        Self {
            items_price,
            tax_price,
            shipping_price,
            total_price: items_price + tax_price + shipping_price,
        }
    }

    /// Client-supplied checkout: the caller's tax/total override the computed
    /// ones and no shipping rule applies.
    pub fn from_client(
        items_price: Decimal,
        tax_override: Option<Decimal>,
        total_override: Option<Decimal>,
    ) -> Self {
        let tax_price = tax_override.unwrap_or_else(|| tax_on(items_price));
        let total_price = total_override.unwrap_or(items_price + tax_price);
        Self { items_price, tax_price, shipping_price: Decimal::ZERO, total_price }
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderError {
    #[error("Order cannot move from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order cannot be cancelled at this stage")]
    NotCancellable,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: ObjectId,
    pub user: ObjectId,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    /// Gateway result blob, stored verbatim on pay.
    pub payment_result: Option<serde_json::Value>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn place(
        user: ObjectId,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        pricing: PriceBreakdown,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            user,
            items,
            shipping_address,
            payment_method,
            items_price: pricing.items_price,
            tax_price: pricing.tax_price,
            shipping_price: pricing.shipping_price,
            total_price: pricing.total_price,
            status: OrderStatus::Pending,
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records the gateway result. Leaves `status` untouched.
    pub fn mark_paid(&mut self, payment_result: serde_json::Value) {
        self.is_paid = true;
        self.paid_at = Some(Utc::now());
        self.payment_result = Some(payment_result);
        self.touch();
    }

    /// Validated status write. Entering Delivered or Cancelled also sets the
    /// corresponding flag/timestamp so the two representations cannot drift.
    pub fn set_status(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::IllegalTransition { from: self.status, to: next });
        }
        self.status = next;
        match next {
            OrderStatus::Delivered => {
                self.is_delivered = true;
                self.delivered_at = Some(Utc::now());
            }
            OrderStatus::Cancelled => {
                self.cancelled_at = Some(Utc::now());
            }
            _ => {}
        }
        self.touch();
        Ok(())
    }

    pub fn deliver(&mut self) -> Result<(), OrderError> {
        self.set_status(OrderStatus::Delivered)
    }

    /// Owner-initiated cancellation, allowed from Pending or Processing only.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if !self.status.is_cancellable() {
            return Err(OrderError::NotCancellable);
        }
        self.set_status(OrderStatus::Cancelled)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Document for Order {
    fn id(&self) -> &ObjectId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address() -> ShippingAddress {
        ShippingAddress {
            street: "1 Main St".into(),
            city: "Pune".into(),
            state: "MH".into(),
            zip: "411001".into(),
            country: "IN".into(),
            phone: "5550100".into(),
        }
    }

    fn order_with(pricing: PriceBreakdown) -> Order {
        Order::place(
            ObjectId::new(),
            vec![],
            address(),
            PaymentMethod::CashOnDelivery,
            pricing,
        )
    }

    #[test]
    fn test_cart_pricing_below_free_shipping() {
        let p = PriceBreakdown::from_cart_total(Decimal::from(250));
        assert_eq!(p.tax_price, Decimal::from(45));
        assert_eq!(p.shipping_price, Decimal::from(100));
        assert_eq!(p.total_price, Decimal::from(395));
    }

    #[test]
    fn test_cart_pricing_above_free_shipping() {
        let p = PriceBreakdown::from_cart_total(Decimal::from(2000));
        assert_eq!(p.tax_price, Decimal::from(360));
        assert_eq!(p.shipping_price, Decimal::ZERO);
        assert_eq!(p.total_price, Decimal::from(2360));
    }

    #[test]
    fn test_client_pricing_overrides() {
        let p = PriceBreakdown::from_client(
            Decimal::from(250),
            Some(Decimal::from(40)),
            Some(Decimal::from(300)),
        );
        assert_eq!(p.tax_price, Decimal::from(40));
        assert_eq!(p.shipping_price, Decimal::ZERO);
        assert_eq!(p.total_price, Decimal::from(300));

        let q = PriceBreakdown::from_client(Decimal::from(250), None, None);
        assert_eq!(q.tax_price, Decimal::from(45));
        assert_eq!(q.total_price, Decimal::from(295));
    }

    #[test]
    fn test_initial_status_is_explicit_pending() {
        let order = order_with(PriceBreakdown::from_cart_total(Decimal::from(100)));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.is_paid);
        assert!(!order.is_delivered);
    }

    #[test]
    fn test_cancel_from_processing_then_again_fails() {
        let mut order = order_with(PriceBreakdown::from_cart_total(Decimal::from(100)));
        order.set_status(OrderStatus::Processing).unwrap();
        order.cancel().unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order.cancelled_at.is_some());
        assert!(matches!(order.cancel(), Err(OrderError::NotCancellable)));
    }

    #[test]
    fn test_cancel_rejected_after_shipping() {
        let mut order = order_with(PriceBreakdown::from_cart_total(Decimal::from(100)));
        order.set_status(OrderStatus::Shipped).unwrap();
        assert!(matches!(order.cancel(), Err(OrderError::NotCancellable)));
        order.deliver().unwrap();
        assert!(matches!(order.cancel(), Err(OrderError::NotCancellable)));
    }

    #[test]
    fn test_illegal_backward_transition() {
        let mut order = order_with(PriceBreakdown::from_cart_total(Decimal::from(100)));
        order.deliver().unwrap();
        assert!(order.is_delivered);
        assert!(matches!(
            order.set_status(OrderStatus::Processing),
            Err(OrderError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_pay_does_not_move_status() {
        let mut order = order_with(PriceBreakdown::from_cart_total(Decimal::from(100)));
        order.mark_paid(json!({ "id": "pay_123", "status": "captured" }));
        assert!(order.is_paid);
        assert!(order.paid_at.is_some());
        assert_eq!(order.status, OrderStatus::Pending);
    }
}
