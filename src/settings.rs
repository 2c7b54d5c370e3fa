// Site settings store
//
// Key/value settings managed from the back office (WhatsApp number,
// delivery fee policy). Reads go through a time-based cache so checkout
// does not hit the settings table on every order.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use validator::Validate;

use crate::auth::AdminUser;
use crate::error::ApiError;

/// Time-to-live for cached settings (60 seconds)
const CACHE_TTL: Duration = Duration::from_secs(60);

/// One settings row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SiteSetting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for upserting a setting
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertSetting {
    #[validate(length(min = 1, message = "Key must not be empty"))]
    pub key: String,
    pub value: String,
}

/// Delivery fee policy derived from settings
///
/// With no threshold configured the flat fee always applies to
/// zone-less delivery orders; with one configured, orders at or above
/// it ship free.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub free_delivery_threshold: Option<Decimal>,
    pub flat_delivery_fee: Decimal,
}

/// Parse the delivery fee policy out of a raw settings map
///
/// Blank or unparsable values fall back to no threshold / zero fee.
pub fn parse_checkout_config(settings: &HashMap<String, String>) -> CheckoutConfig {
    let free_delivery_threshold = settings
        .get("free_delivery_threshold")
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<Decimal>().ok());

    let flat_delivery_fee = settings
        .get("delivery_flat_fee")
        .and_then(|v| v.trim().parse::<Decimal>().ok())
        .unwrap_or(Decimal::ZERO);

    CheckoutConfig {
        free_delivery_threshold,
        flat_delivery_fee,
    }
}

/// Cached read-through store over the site_settings table
#[derive(Clone)]
pub struct SettingsStore {
    pool: PgPool,
    cache: Arc<RwLock<Option<(HashMap<String, String>, Instant)>>>,
}

impl SettingsStore {
    /// Create a new SettingsStore
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// All settings as a key/value map, served from cache while fresh
    pub async fn all(&self) -> Result<HashMap<String, String>, sqlx::Error> {
        {
            let cache = self.cache.read().await;
            if let Some((settings, loaded_at)) = cache.as_ref() {
                if loaded_at.elapsed() <= CACHE_TTL {
                    return Ok(settings.clone());
                }
            }
        }

        let rows = sqlx::query_as::<_, SiteSetting>("SELECT * FROM site_settings")
            .fetch_all(&self.pool)
            .await?;

        let settings: HashMap<String, String> =
            rows.into_iter().map(|row| (row.key, row.value)).collect();

        let mut cache = self.cache.write().await;
        *cache = Some((settings.clone(), Instant::now()));

        Ok(settings)
    }

    /// One setting value, if present
    pub async fn get(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        Ok(self.all().await?.get(key).cloned())
    }

    /// The delivery fee policy for checkout
    pub async fn checkout_config(&self) -> Result<CheckoutConfig, sqlx::Error> {
        Ok(parse_checkout_config(&self.all().await?))
    }

    /// The configured WhatsApp number for order hand-off
    pub async fn whatsapp_number(&self) -> Result<Option<String>, sqlx::Error> {
        self.get("whatsapp_number").await
    }

    /// Insert or replace a setting and drop the cache
    pub async fn upsert(&self, key: &str, value: &str) -> Result<SiteSetting, sqlx::Error> {
        let setting = sqlx::query_as::<_, SiteSetting>(
            r#"
            INSERT INTO site_settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;

        let mut cache = self.cache.write().await;
        *cache = None;

        Ok(setting)
    }
}

/// Handler for GET /api/settings
/// Public key/value settings map for the storefront
pub async fn get_settings_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<HashMap<String, String>>, ApiError> {
    let settings = state.settings.all().await?;
    Ok(Json(settings))
}

/// Handler for PUT /api/admin/settings
pub async fn upsert_setting_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Json(payload): Json<UpsertSetting>,
) -> Result<Json<SiteSetting>, ApiError> {
    payload.validate()?;

    let setting = state.settings.upsert(&payload.key, &payload.value).await?;
    tracing::info!("Updated site setting '{}'", setting.key);
    Ok(Json(setting))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_checkout_config_full() {
        let config = parse_checkout_config(&map(&[
            ("free_delivery_threshold", "80.00"),
            ("delivery_flat_fee", "8.00"),
        ]));

        assert_eq!(config.free_delivery_threshold, Some(dec!(80.00)));
        assert_eq!(config.flat_delivery_fee, dec!(8.00));
    }

    #[test]
    fn test_parse_checkout_config_blank_threshold_means_none() {
        let config = parse_checkout_config(&map(&[
            ("free_delivery_threshold", ""),
            ("delivery_flat_fee", "8.00"),
        ]));

        assert!(config.free_delivery_threshold.is_none());
    }

    #[test]
    fn test_parse_checkout_config_missing_keys_fall_back() {
        let config = parse_checkout_config(&map(&[]));

        assert!(config.free_delivery_threshold.is_none());
        assert_eq!(config.flat_delivery_fee, Decimal::ZERO);
    }

    #[test]
    fn test_parse_checkout_config_garbage_is_ignored() {
        let config = parse_checkout_config(&map(&[
            ("free_delivery_threshold", "not-a-number"),
            ("delivery_flat_fee", "also-bad"),
        ]));

        assert!(config.free_delivery_threshold.is_none());
        assert_eq!(config.flat_delivery_fee, Decimal::ZERO);
    }
}
