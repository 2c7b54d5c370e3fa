// HTTP handlers for pizza sizes, borders, per-size prices and quotes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::collections::HashMap;
use validator::Validate;

use crate::auth::AdminUser;
use crate::models::Product;
use crate::validation;
use crate::pizza::builder::PizzaSelection;
use crate::pizza::error::PizzaError;
use crate::pizza::models::{
    CreatePizzaBorder, CreatePizzaSize, CreateProductPrice, PizzaBorder, PizzaQuoteRequest,
    PizzaQuoteResponse, PizzaSize, ProductPrice, QuotedFlavor, UpdatePizzaBorder, UpdatePizzaSize,
};
use crate::AppState;

/// Handler for GET /api/pizza/sizes
/// Lists active pizza sizes for the storefront
pub async fn list_sizes_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PizzaSize>>, PizzaError> {
    let sizes = state.pizza_repo.list_sizes(true).await?;
    Ok(Json(sizes))
}

/// Handler for GET /api/admin/pizza/sizes
/// Lists every pizza size, including inactive ones
pub async fn list_all_sizes_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<PizzaSize>>, PizzaError> {
    let sizes = state.pizza_repo.list_sizes(false).await?;
    Ok(Json(sizes))
}

/// Handler for POST /api/admin/pizza/sizes
pub async fn create_size_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreatePizzaSize>,
) -> Result<(StatusCode, Json<PizzaSize>), PizzaError> {
    payload
        .validate()
        .map_err(|e| PizzaError::ValidationError(e.to_string()))?;

    if validation::validate_price_multiplier(payload.price_multiplier).is_err() {
        return Err(PizzaError::ValidationError(
            "Price multiplier must not be negative".to_string(),
        ));
    }

    let size = state.pizza_repo.create_size(&payload).await?;
    tracing::info!("Created pizza size {} ({})", size.id, size.name);
    Ok((StatusCode::CREATED, Json(size)))
}

/// Handler for PUT /api/admin/pizza/sizes/:id
/// Partial update keeping existing values for omitted fields
pub async fn update_size_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePizzaSize>,
) -> Result<Json<PizzaSize>, PizzaError> {
    payload
        .validate()
        .map_err(|e| PizzaError::ValidationError(e.to_string()))?;

    let mut existing = state
        .pizza_repo
        .find_size(id)
        .await?
        .ok_or(PizzaError::SizeNotFound(id))?;

    if let Some(code) = payload.code {
        existing.code = code;
    }
    if let Some(name) = payload.name {
        existing.name = name;
    }
    if payload.description.is_some() {
        existing.description = payload.description;
    }
    if let Some(multiplier) = payload.price_multiplier {
        existing.price_multiplier = multiplier;
    }
    if let Some(max_flavors) = payload.max_flavors {
        existing.max_flavors = max_flavors;
    }
    if let Some(display_order) = payload.display_order {
        existing.display_order = display_order;
    }
    if let Some(is_active) = payload.is_active {
        existing.is_active = is_active;
    }

    let updated = state.pizza_repo.update_size(&existing).await?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/admin/pizza/sizes/:id
pub async fn delete_size_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, PizzaError> {
    if !state.pizza_repo.delete_size(id).await? {
        return Err(PizzaError::SizeNotFound(id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/pizza/borders
/// Lists active pizza borders for the storefront
pub async fn list_borders_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PizzaBorder>>, PizzaError> {
    let borders = state.pizza_repo.list_borders(true).await?;
    Ok(Json(borders))
}

/// Handler for GET /api/admin/pizza/borders
pub async fn list_all_borders_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<PizzaBorder>>, PizzaError> {
    let borders = state.pizza_repo.list_borders(false).await?;
    Ok(Json(borders))
}

/// Handler for POST /api/admin/pizza/borders
pub async fn create_border_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreatePizzaBorder>,
) -> Result<(StatusCode, Json<PizzaBorder>), PizzaError> {
    payload
        .validate()
        .map_err(|e| PizzaError::ValidationError(e.to_string()))?;

    if validation::validate_non_negative_amount(payload.additional_price).is_err() {
        return Err(PizzaError::ValidationError(
            "Additional price must not be negative".to_string(),
        ));
    }

    let border = state.pizza_repo.create_border(&payload).await?;
    tracing::info!("Created pizza border {} ({})", border.id, border.name);
    Ok((StatusCode::CREATED, Json(border)))
}

/// Handler for PUT /api/admin/pizza/borders/:id
pub async fn update_border_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePizzaBorder>,
) -> Result<Json<PizzaBorder>, PizzaError> {
    let mut existing = state
        .pizza_repo
        .find_border(id)
        .await?
        .ok_or(PizzaError::BorderNotFound(id))?;

    if let Some(name) = payload.name {
        existing.name = name;
    }
    if payload.description.is_some() {
        existing.description = payload.description;
    }
    if let Some(additional_price) = payload.additional_price {
        existing.additional_price = additional_price;
    }
    if let Some(display_order) = payload.display_order {
        existing.display_order = display_order;
    }
    if let Some(is_active) = payload.is_active {
        existing.is_active = is_active;
    }

    let updated = state.pizza_repo.update_border(&existing).await?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/admin/pizza/borders/:id
pub async fn delete_border_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, PizzaError> {
    if !state.pizza_repo.delete_border(id).await? {
        return Err(PizzaError::BorderNotFound(id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/products/:id/prices
/// Per-size price overrides for one product
pub async fn product_prices_handler(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Vec<ProductPrice>>, PizzaError> {
    let prices = state.pizza_repo.prices_for_product(product_id).await?;
    Ok(Json(prices))
}

/// Handler for POST /api/admin/product-prices
/// Creates or replaces the override for (product, size)
pub async fn upsert_price_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateProductPrice>,
) -> Result<(StatusCode, Json<ProductPrice>), PizzaError> {
    if validation::validate_positive_amount(payload.price).is_err() {
        return Err(PizzaError::ValidationError(
            "Price must be a positive number".to_string(),
        ));
    }

    let price = state
        .pizza_repo
        .upsert_price(payload.product_id, payload.size_id, payload.price)
        .await?;

    Ok((StatusCode::CREATED, Json(price)))
}

/// Handler for DELETE /api/admin/product-prices/:product_id/:size_id
pub async fn delete_price_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((product_id, size_id)): Path<(i32, i32)>,
) -> Result<StatusCode, PizzaError> {
    if !state.pizza_repo.delete_price(product_id, size_id).await? {
        return Err(PizzaError::FlavorNotFound(product_id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/pizza/quote
///
/// Composes a pizza from the requested size, border and flavors and
/// returns the derived price without touching the cart or any order.
pub async fn quote_handler(
    State(state): State<AppState>,
    Json(request): Json<PizzaQuoteRequest>,
) -> Result<Json<PizzaQuoteResponse>, PizzaError> {
    request
        .validate()
        .map_err(|e| PizzaError::ValidationError(e.to_string()))?;

    let (selection, total_price) = compose_selection(&state, &request).await?;

    let size = selection
        .size()
        .cloned()
        .ok_or_else(|| PizzaError::ValidationError("Size missing from selection".to_string()))?;
    let response = PizzaQuoteResponse {
        size_id: size.id,
        size_name: size.name.clone(),
        border_id: selection.border().map(|b| b.id),
        flavors: selection
            .flavors()
            .iter()
            .map(|f| QuotedFlavor {
                product_id: f.product.id,
                name: f.product.name.clone(),
                fraction: f.fraction,
            })
            .collect(),
        total_price,
    };

    Ok(Json(response))
}

/// Build a priced PizzaSelection from a quote-style request
pub async fn compose_selection(
    state: &AppState,
    request: &PizzaQuoteRequest,
) -> Result<(PizzaSelection, rust_decimal::Decimal), PizzaError> {
    let size = state
        .pizza_repo
        .find_size(request.size_id)
        .await?
        .filter(|s| s.is_active)
        .ok_or(PizzaError::SizeNotFound(request.size_id))?;

    let border = match request.border_id {
        Some(border_id) => Some(
            state
                .pizza_repo
                .find_border(border_id)
                .await?
                .filter(|b| b.is_active)
                .ok_or(PizzaError::BorderNotFound(border_id))?,
        ),
        None => None,
    };

    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE id = ANY($1) AND is_active = TRUE",
    )
    .bind(&request.flavor_product_ids)
    .fetch_all(&state.db)
    .await?;

    let product_map: HashMap<i32, Product> =
        products.into_iter().map(|p| (p.id, p)).collect();

    let mut flavors = Vec::with_capacity(request.flavor_product_ids.len());
    for product_id in &request.flavor_product_ids {
        let product = product_map
            .get(product_id)
            .cloned()
            .ok_or(PizzaError::FlavorNotFound(*product_id))?;
        flavors.push(product);
    }

    let overrides = state
        .pizza_repo
        .prices_for_products(&request.flavor_product_ids)
        .await?;

    crate::pizza::builder::price_composition(size, border, flavors, &overrides)
}
