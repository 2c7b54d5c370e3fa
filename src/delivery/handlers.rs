// HTTP handlers for delivery zones and neighborhood resolution

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::AdminUser;
use crate::delivery::error::DeliveryError;
use crate::validation;
use crate::delivery::models::{CreateDeliveryZone, DeliveryZone, ResolveZoneRequest, UpdateDeliveryZone};
use crate::delivery::resolver::{self, ZoneResolution};
use crate::AppState;

/// Handler for GET /api/delivery/zones
/// Lists active zones for the checkout selector
pub async fn list_zones_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeliveryZone>>, DeliveryError> {
    let zones = state.zones_repo.list(true).await?;
    Ok(Json(zones))
}

/// Handler for GET /api/admin/delivery/zones
pub async fn list_all_zones_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<DeliveryZone>>, DeliveryError> {
    let zones = state.zones_repo.list(false).await?;
    Ok(Json(zones))
}

/// Handler for POST /api/delivery/resolve
///
/// Matches a neighborhood against the active zones. The optional CEP is
/// validated for shape only; no postal lookup happens server-side.
pub async fn resolve_zone_handler(
    State(state): State<AppState>,
    Json(request): Json<ResolveZoneRequest>,
) -> Result<Json<ZoneResolution>, DeliveryError> {
    request
        .validate()
        .map_err(|e| DeliveryError::ValidationError(e.to_string()))?;

    if let Some(ref cep) = request.cep {
        resolver::normalize_cep(cep)?;
    }

    let zones = state.zones_repo.list(true).await?;
    let resolution = resolver::resolve(&request.neighborhood, &zones);

    Ok(Json(resolution))
}

/// Handler for POST /api/admin/delivery/zones
pub async fn create_zone_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateDeliveryZone>,
) -> Result<(StatusCode, Json<DeliveryZone>), DeliveryError> {
    payload
        .validate()
        .map_err(|e| DeliveryError::ValidationError(e.to_string()))?;

    if validation::validate_non_negative_amount(payload.delivery_fee).is_err() {
        return Err(DeliveryError::ValidationError(
            "Delivery fee must not be negative".to_string(),
        ));
    }

    let zone = state.zones_repo.create(&payload).await?;
    tracing::info!("Created delivery zone {} ({})", zone.id, zone.name);
    Ok((StatusCode::CREATED, Json(zone)))
}

/// Handler for PUT /api/admin/delivery/zones/:id
/// Partial update keeping existing values for omitted fields
pub async fn update_zone_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateDeliveryZone>,
) -> Result<Json<DeliveryZone>, DeliveryError> {
    let mut existing = state
        .zones_repo
        .find_by_id(id)
        .await?
        .ok_or(DeliveryError::ZoneNotFound(id))?;

    if let Some(name) = payload.name {
        existing.name = name;
    }
    if let Some(neighborhoods) = payload.neighborhoods {
        existing.neighborhoods = neighborhoods;
    }
    if let Some(delivery_fee) = payload.delivery_fee {
        existing.delivery_fee = delivery_fee;
    }
    if let Some(estimated_time_min) = payload.estimated_time_min {
        existing.estimated_time_min = estimated_time_min;
    }
    if let Some(estimated_time_max) = payload.estimated_time_max {
        existing.estimated_time_max = estimated_time_max;
    }
    if let Some(display_order) = payload.display_order {
        existing.display_order = display_order;
    }
    if let Some(is_active) = payload.is_active {
        existing.is_active = is_active;
    }

    let updated = state.zones_repo.update(&existing).await?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/admin/delivery/zones/:id
pub async fn delete_zone_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DeliveryError> {
    if !state.zones_repo.delete(id).await? {
        return Err(DeliveryError::ZoneNotFound(id));
    }

    Ok(StatusCode::NO_CONTENT)
}
