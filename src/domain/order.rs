//! Order record and status lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::cart::{Cart, LineItem};
use crate::domain::pricing::Quote;

/// Order lifecycle states.
///
/// The legal transitions are `pending → paid → shipped → delivered`, with a
/// cancellation branch out of `pending` and `paid`. `delivered` and
/// `cancelled` are terminal. This table is the single source of truth; the
/// HTTP layer never decides legality on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

pub const ALL_STATUSES: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Paid,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
];

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether `next` is a legal successor of `self`. Same-state requests are
    /// not legal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid)
                | (Pending, Cancelled)
                | (Paid, Shipped)
                | (Paid, Cancelled)
                | (Shipped, Delivered)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown order status '{0}'")]
pub struct ParseStatusError(String);

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Payment method label. Stored as-is; no settlement is performed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cod,
    Stripe,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::Paypal => "paypal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown payment method '{0}'")]
pub struct ParsePaymentError(String);

impl FromStr for PaymentMethod {
    type Err = ParsePaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(PaymentMethod::Cod),
            "stripe" => Ok(PaymentMethod::Stripe),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(ParsePaymentError(other.to_string())),
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = ParsePaymentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An immutable financial record created from a cart at checkout.
///
/// Items are a frozen copy of the cart's line items; they are never re-derived
/// from the live catalog. Only `status` (and `updated_at`) change after
/// creation.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(json)]
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub shipping_address: Option<serde_json::Value>,
    #[sqlx(try_from = "String")]
    pub payment_method: PaymentMethod,
    pub payment_transaction: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a new `pending` order from a cart and its priced quote. The
    /// cart's items are cloned, not moved; clearing the cart is the caller's
    /// (transactional) concern.
    pub fn from_cart(
        user_id: Uuid,
        cart: &Cart,
        quote: Quote,
        shipping_address: Option<serde_json::Value>,
        payment_method: PaymentMethod,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            items: cart.items.clone(),
            subtotal: cart.subtotal,
            tax: quote.tax,
            shipping: quote.shipping,
            total: quote.total,
            status: OrderStatus::Pending,
            shipping_address,
            payment_method,
            payment_transaction: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGAL: [(OrderStatus, OrderStatus); 5] = [
        (OrderStatus::Pending, OrderStatus::Paid),
        (OrderStatus::Pending, OrderStatus::Cancelled),
        (OrderStatus::Paid, OrderStatus::Shipped),
        (OrderStatus::Paid, OrderStatus::Cancelled),
        (OrderStatus::Shipped, OrderStatus::Delivered),
    ];

    #[test]
    fn test_transition_table_is_exhaustive() {
        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                let legal = LEGAL.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    legal,
                    "{from} -> {to} should be {}",
                    if legal { "legal" } else { "illegal" }
                );
            }
        }
    }

    #[test]
    fn test_same_state_is_illegal() {
        for status in ALL_STATUSES {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_terminal_states_have_no_successors() {
        for from in ALL_STATUSES.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL_STATUSES {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn test_status_parse_round_trip() {
        for status in ALL_STATUSES {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("refunded".parse::<OrderStatus>().is_err());
        assert!("Pending".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("cod".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cod);
        assert_eq!(
            "stripe".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Stripe
        );
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }
}
