use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Represents a menu category in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Pizzas Tradicionais")]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[schema(example = 0)]
    pub display_order: i32,
    #[schema(example = true)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents a catalog product in the database
///
/// `price` is the base price; when a `product_prices` row exists for a
/// pizza size, that per-size price fully overrides the base price.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    #[schema(example = 1)]
    pub id: i32,
    pub category_id: Option<i32>,
    #[schema(example = "Calabresa")]
    pub name: String,
    #[schema(example = "Calabresa, cebola e azeitonas")]
    pub description: Option<String>,
    /// Base price, overridden per size when size-specific pricing exists
    #[schema(value_type = f64, example = 35.0)]
    pub price: Decimal,
    pub image_url: Option<String>,
    #[schema(example = false)]
    pub is_vegetarian: bool,
    #[schema(example = false)]
    pub is_featured: bool,
    #[schema(example = true)]
    pub is_active: bool,
    #[schema(example = 0)]
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents the data needed to create a new product
///
/// Used for POST /api/products requests; id and timestamps are
/// generated by the database
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    pub category_id: Option<i32>,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    #[schema(example = "Margherita")]
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = f64, example = 32.0)]
    pub price: Decimal,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: i32,
}

/// Represents the data for updating an existing product
///
/// All fields are optional to support partial updates
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    pub category_id: Option<i32>,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub is_vegetarian: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Request DTO for updating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Product serialization keeps every catalog field
    #[test]
    fn test_product_serialization() {
        let product = Product {
            id: 1,
            category_id: Some(2),
            name: "Calabresa".to_string(),
            description: Some("Calabresa, cebola e azeitonas".to_string()),
            price: dec!(35.00),
            image_url: None,
            is_vegetarian: false,
            is_featured: true,
            is_active: true,
            display_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&product).expect("Failed to serialize Product");

        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"name\":\"Calabresa\""));
        assert!(json.contains("\"price\":\"35.00\""));
        assert!(json.contains("\"is_featured\":true"));
        assert!(json.contains("\"created_at\""));
    }

    /// CreateProduct defaults flags when omitted
    #[test]
    fn test_create_product_defaults() {
        let json = r#"{
            "name": "Margherita",
            "price": "32.00"
        }"#;

        let create: CreateProduct = serde_json::from_str(json)
            .expect("Failed to deserialize CreateProduct");

        assert_eq!(create.name, "Margherita");
        assert_eq!(create.price, dec!(32.00));
        assert!(!create.is_vegetarian);
        assert!(!create.is_featured);
        assert!(create.is_active);
        assert_eq!(create.display_order, 0);
    }

    /// UpdateProduct supports partial payloads
    #[test]
    fn test_update_product_partial_fields() {
        let json = r#"{
            "price": "38.50",
            "is_featured": true
        }"#;

        let update: UpdateProduct = serde_json::from_str(json)
            .expect("Failed to deserialize UpdateProduct");

        assert_eq!(update.price, Some(dec!(38.50)));
        assert_eq!(update.is_featured, Some(true));
        assert_eq!(update.name, None);
        assert_eq!(update.category_id, None);
    }

    /// Empty update payload deserializes with every field absent
    #[test]
    fn test_update_product_empty() {
        let update: UpdateProduct = serde_json::from_str("{}")
            .expect("Failed to deserialize UpdateProduct");

        assert!(update.name.is_none());
        assert!(update.price.is_none());
        assert!(update.is_active.is_none());
    }
}
