// HTTP handlers for order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AdminUser, AuthenticatedUser, Role};
use crate::orders::error::OrderError;
use crate::orders::models::{
    AdvanceStatusRequest, CreateOrderRequest, OrderResponse, OrderStatus, OrderStatusHistory,
    UpdateStatusRequest,
};
use crate::orders::whatsapp::{self, WhatsAppHandoff};
use crate::AppState;

/// Query parameters for the back-office order list
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    /// Optional status filter
    pub status: Option<OrderStatus>,
}

/// Handler for POST /api/orders
///
/// Guest checkout is allowed: without a bearer token the order is
/// stored unowned and skips coupon application and loyalty accrual.
pub async fn create_order_handler(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), OrderError> {
    request
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;

    let response = state
        .order_service
        .place_order(user.map(|u| u.user_id), request)
        .await?;

    tracing::info!("Created order {} ({} items)", response.id, response.items.len());
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /api/orders
/// Order history for the authenticated user
pub async fn get_my_orders_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<OrderResponse>>, OrderError> {
    let orders = state.order_service.get_user_orders(user.user_id).await?;
    Ok(Json(orders))
}

/// Handler for GET /api/orders/:order_id
/// Owners see their own orders; admins see any
pub async fn get_order_by_id_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, OrderError> {
    let order = state
        .order_service
        .get_order_by_id(order_id, Some(user.user_id), user.role == Role::Admin)
        .await?;

    Ok(Json(order))
}

/// Handler for GET /api/orders/:order_id/history
/// The append-only status trail, oldest first
pub async fn order_history_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<OrderStatusHistory>>, OrderError> {
    // Ownership check rides on the same rule as the order itself
    state
        .order_service
        .get_order_by_id(order_id, Some(user.user_id), user.role == Role::Admin)
        .await?;

    let history = state.order_service.status_history(order_id).await?;
    Ok(Json(history))
}

/// Handler for GET /api/orders/:order_id/whatsapp
/// Message and wa.me deep link for the order hand-off
pub async fn order_whatsapp_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<WhatsAppHandoff>, OrderError> {
    let (order, items) = state
        .order_service
        .order_parts(order_id, Some(user.user_id), user.role == Role::Admin)
        .await?;

    let number = state
        .settings
        .whatsapp_number()
        .await?
        .unwrap_or_else(|| "5511999999999".to_string());

    let message = whatsapp::order_message(&order, &items);
    let url = whatsapp::order_link(&number, &message);

    Ok(Json(WhatsAppHandoff { message, url }))
}

/// Handler for GET /api/admin/orders
/// Full order list with optional status filter
pub async fn list_orders_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderResponse>>, OrderError> {
    let orders = state.order_service.list_orders(query.status).await?;
    Ok(Json(orders))
}

/// Handler for POST /api/admin/orders/:order_id/advance
/// Guarded quick action: one step along the linear chain
pub async fn advance_order_handler(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<AdvanceStatusRequest>,
) -> Result<Json<OrderResponse>, OrderError> {
    let order = state
        .order_service
        .advance_status(order_id, request.notes.as_deref(), Some(admin.user_id))
        .await?;

    let response = state
        .order_service
        .get_order_by_id(order.id, Some(admin.user_id), true)
        .await?;

    Ok(Json(response))
}

/// Handler for PATCH /api/admin/orders/:order_id/status
/// Unguarded manual override (operator escape hatch)
pub async fn set_order_status_handler(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, OrderError> {
    request
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;

    let order = state
        .order_service
        .force_set_status(
            order_id,
            request.status,
            request.notes.as_deref(),
            Some(admin.user_id),
        )
        .await?;

    let response = state
        .order_service
        .get_order_by_id(order.id, Some(admin.user_id), true)
        .await?;

    Ok(Json(response))
}
