use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A pizza size option
///
/// `price_multiplier` scales the most expensive selected flavor's price;
/// `max_flavors` bounds how many flavors a pizza of this size can carry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PizzaSize {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_multiplier: Decimal,
    pub max_flavors: i32,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pizza border (stuffed crust) option with a flat add-on price
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PizzaBorder {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub additional_price: Decimal,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-size price override for a product
///
/// When a row exists for (product, size) it fully replaces the product's
/// base price for that size.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductPrice {
    pub id: i32,
    pub product_id: i32,
    pub size_id: i32,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a pizza size
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePizzaSize {
    #[validate(length(min = 1, message = "Code must not be empty"))]
    pub code: String,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub price_multiplier: Decimal,
    #[validate(range(min = 1, message = "A size must allow at least one flavor"))]
    pub max_flavors: i32,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Request DTO for updating a pizza size
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePizzaSize {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_multiplier: Option<Decimal>,
    #[validate(range(min = 1, message = "A size must allow at least one flavor"))]
    pub max_flavors: Option<i32>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Request DTO for creating a pizza border
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePizzaBorder {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub additional_price: Decimal,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Request DTO for updating a pizza border
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePizzaBorder {
    pub name: Option<String>,
    pub description: Option<String>,
    pub additional_price: Option<Decimal>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Request DTO for creating a per-size price override
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductPrice {
    pub product_id: i32,
    pub size_id: i32,
    pub price: Decimal,
}

/// Request DTO for quoting a pizza composition
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PizzaQuoteRequest {
    pub size_id: i32,
    pub border_id: Option<i32>,
    #[validate(length(min = 1, message = "Select at least one flavor"))]
    pub flavor_product_ids: Vec<i32>,
}

/// One flavor line in a quote response
#[derive(Debug, Serialize)]
pub struct QuotedFlavor {
    pub product_id: i32,
    pub name: String,
    pub fraction: f64,
}

/// Response DTO for a pizza quote
#[derive(Debug, Serialize)]
pub struct PizzaQuoteResponse {
    pub size_id: i32,
    pub size_name: String,
    pub border_id: Option<i32>,
    pub flavors: Vec<QuotedFlavor>,
    pub total_price: Decimal,
}

fn default_true() -> bool {
    true
}
