use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A delivery catchment area keyed by a set of neighborhood names,
/// carrying a flat fee and an ETA range
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeliveryZone {
    pub id: i32,
    pub name: String,
    pub neighborhoods: Vec<String>,
    pub delivery_fee: Decimal,
    pub estimated_time_min: i32,
    pub estimated_time_max: i32,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a delivery zone
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDeliveryZone {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub neighborhoods: Vec<String>,
    pub delivery_fee: Decimal,
    #[serde(default = "default_eta_min")]
    pub estimated_time_min: i32,
    #[serde(default = "default_eta_max")]
    pub estimated_time_max: i32,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Request DTO for updating a delivery zone
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDeliveryZone {
    pub name: Option<String>,
    pub neighborhoods: Option<Vec<String>>,
    pub delivery_fee: Option<Decimal>,
    pub estimated_time_min: Option<i32>,
    pub estimated_time_max: Option<i32>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Request DTO for resolving a neighborhood to a zone
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveZoneRequest {
    #[validate(length(min = 1, message = "Neighborhood must not be empty"))]
    pub neighborhood: String,
    /// Optional CEP; validated for shape only, matching is by neighborhood
    pub cep: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_eta_min() -> i32 {
    30
}

fn default_eta_max() -> i32 {
    60
}
