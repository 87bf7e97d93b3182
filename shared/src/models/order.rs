//! Order rows and views

use serde::{Deserialize, Serialize};

use crate::order::{OrderStatus, PaymentMethod};

/// Order row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub created_at: i64,
    pub status: OrderStatus,
    /// Method chosen at checkout
    pub requested_payment_method: PaymentMethod,
    /// Method actually used, set when the order is settled
    pub payment_method: Option<PaymentMethod>,
    pub paid_at: Option<i64>,
    pub subtotal: i64,
    pub fee: i64,
    pub total: i64,
}

/// Order line with the unit price captured at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub order_id: i64,
    pub dish_id: i64,
    pub dish_name: String,
    pub quantity: i64,
    pub note: Option<String>,
    pub unit_price: i64,
}

/// Order with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order as listed for the restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
}

/// Order as listed for the customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerOrder {
    #[serde(flatten)]
    pub order: Order,
    pub restaurant_name: String,
    pub reviewed: bool,
    pub items: Vec<OrderItem>,
}

/// Restaurant-driven status change; the status is parsed explicitly so an
/// unknown name maps to its own error code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Settlement payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_id: i64,
    #[serde(default)]
    pub payment_method: Option<String>,
}
