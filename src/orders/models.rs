use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::pizza::models::PizzaQuoteRequest;

/// Order status enum representing the lifecycle of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivering,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "delivering" => Ok(OrderStatus::Delivering),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the order reaches the customer
///
/// Pickup and dine-in orders carry no delivery fee and skip zone
/// resolution entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Delivery,
    Pickup,
    DineIn,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::Delivery
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Delivery => write!(f, "delivery"),
            OrderType::Pickup => write!(f, "pickup"),
            OrderType::DineIn => write!(f, "dine_in"),
        }
    }
}

/// Domain model representing an order in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub status: OrderStatus,
    pub order_type: OrderType,
    pub delivery_zone_id: Option<i32>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery_fee: Decimal,
    pub total_amount: Decimal,
    pub payment_method: Option<String>,
    pub change_for: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Domain model representing an item within an order
///
/// `product_name` and `unit_price` are snapshots taken at order time;
/// later catalog edits never change a placed order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: Uuid,
    pub product_id: Option<i32>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// One row of the append-only status audit trail
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderStatusHistory {
    pub id: i32,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub changed_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// One cart line in an order creation request
///
/// Either a catalog product (optionally size-priced) or a composed
/// pizza; exactly one of `product_id` / `pizza` must be present.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub product_id: Option<i32>,
    /// Size for size-priced catalog items
    pub size_id: Option<i32>,
    /// A pizza composed in the builder
    pub pizza: Option<PizzaQuoteRequest>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Request DTO for creating a new order
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Customer name must not be empty"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "Customer phone must not be empty"))]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub order_type: OrderType,
    pub delivery_zone_id: Option<i32>,
    pub payment_method: Option<String>,
    pub change_for: Option<Decimal>,
    pub notes: Option<String>,
    pub coupon_code: Option<String>,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
}

/// Request DTO for the admin manual status override
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

/// Request DTO for the guarded one-step advance
#[derive(Debug, Deserialize)]
pub struct AdvanceStatusRequest {
    pub notes: Option<String>,
}

/// Fields of a new order before it is persisted
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub order_type: OrderType,
    pub delivery_zone_id: Option<i32>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery_fee: Decimal,
    pub total_amount: Decimal,
    pub payment_method: Option<String>,
    pub change_for: Option<Decimal>,
    pub notes: Option<String>,
}

/// One resolved order line before it is persisted
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Option<i32>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Response DTO for order item
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product_id: Option<i32>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.subtotal,
        }
    }
}

/// Response DTO for order with items
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub status: OrderStatus,
    pub order_type: OrderType,
    pub delivery_zone_id: Option<i32>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery_fee: Decimal,
    pub total_amount: Decimal,
    pub payment_method: Option<String>,
    pub change_for: Option<Decimal>,
    pub notes: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    /// Assemble a response from an order row and its items
    pub fn from_parts(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            customer_address: order.customer_address,
            status: order.status,
            order_type: order.order_type,
            delivery_zone_id: order.delivery_zone_id,
            subtotal: order.subtotal,
            discount: order.discount,
            delivery_fee: order.delivery_fee,
            total_amount: order.total_amount,
            payment_method: order.payment_method,
            change_for: order.change_for,
            notes: order.notes,
            items: items.into_iter().map(|item| item.into()).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trip() {
        let statuses = [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Delivering,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ];

        for status in statuses {
            assert_eq!(OrderStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_order_status_parse_is_case_insensitive() {
        assert_eq!(
            OrderStatus::from_str("DELIVERING").unwrap(),
            OrderStatus::Delivering
        );
        assert!(OrderStatus::from_str("unknown").is_err());
    }

    #[test]
    fn test_order_type_serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&OrderType::DineIn).unwrap(), "\"dine_in\"");
        let parsed: OrderType = serde_json::from_str("\"pickup\"").unwrap();
        assert_eq!(parsed, OrderType::Pickup);
    }

    #[test]
    fn test_create_order_request_defaults() {
        let json = r#"{
            "customer_name": "Maria",
            "customer_phone": "11999990000",
            "items": [{"product_id": 1, "quantity": 2}]
        }"#;

        let request: CreateOrderRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.order_type, OrderType::Delivery);
        assert_eq!(request.customer_address, "");
        assert!(request.coupon_code.is_none());
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 2);
        assert!(request.items[0].pizza.is_none());
    }
}
