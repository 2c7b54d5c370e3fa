pub mod auth;
pub mod coupons;
pub mod db;
pub mod delivery;
pub mod error;
pub mod loyalty;
pub mod models;
pub mod orders;
pub mod pizza;
pub mod query;
pub mod settings;
pub mod validation;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::repository::{TokenRepository, UserRepository};
use auth::token::TokenService;
use auth::{AdminUser, AuthService};
use coupons::{CouponRepository, CouponService};
use delivery::DeliveryZoneRepository;
use error::ApiError;
use loyalty::{LoyaltyRepository, LoyaltyService};
use models::{Category, CreateCategory, CreateProduct, Product, UpdateCategory, UpdateProduct};
use orders::{OrderEvents, OrderItemsRepository, OrderService, OrdersRepository, ProductRepository};
use pizza::PizzaOptionsRepository;
use query::{QueryParams, QueryValidator};
use settings::SettingsStore;
use validator::Validate;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        create_product,
        get_products,
        get_product_by_id,
        update_product,
        delete_product,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct, Category, CreateCategory, UpdateCategory)
    ),
    tags(
        (name = "catalog", description = "Product catalog management endpoints")
    ),
    info(
        title = "Pizzeria API",
        version = "1.0.0",
        description = "RESTful API for a pizzeria storefront: catalog, pizza builder, promotions, loyalty and orders",
        contact(
            name = "API Support",
            email = "suporte@pizzeria.com"
        )
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth_service: Arc<AuthService>,
    pub pizza_repo: PizzaOptionsRepository,
    pub zones_repo: DeliveryZoneRepository,
    pub coupon_service: CouponService,
    pub loyalty_service: LoyaltyService,
    pub order_service: OrderService,
    pub settings: SettingsStore,
    pub order_events: OrderEvents,
}

impl AppState {
    /// Wire every repository and service over one connection pool
    pub fn new(db: PgPool) -> Self {
        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "insecure-dev-secret".to_string());

        let auth_service = Arc::new(AuthService::new(
            UserRepository::new(db.clone()),
            TokenRepository::new(db.clone()),
            TokenService::new(jwt_secret),
        ));

        let pizza_repo = PizzaOptionsRepository::new(db.clone());
        let zones_repo = DeliveryZoneRepository::new(db.clone());
        let coupon_service = CouponService::new(CouponRepository::new(db.clone()));
        let loyalty_service = LoyaltyService::new(LoyaltyRepository::new(db.clone()));
        let settings = SettingsStore::new(db.clone());
        let order_events = OrderEvents::new();

        let order_service = OrderService::new(
            OrdersRepository::new(db.clone()),
            OrderItemsRepository::new(db.clone()),
            ProductRepository::new(db.clone()),
            pizza_repo.clone(),
            zones_repo.clone(),
            coupon_service.clone(),
            loyalty_service.clone(),
            settings.clone(),
            order_events.clone(),
        );

        Self {
            db,
            auth_service,
            pizza_repo,
            zones_repo,
            coupon_service,
            loyalty_service,
            order_service,
            settings,
            order_events,
        }
    }
}

/// Handler for POST /api/admin/products
/// Creates a new catalog product
#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Price must be a positive number"})),
        (status = 409, description = "Duplicate product name", body = String, example = json!({"error": "Product already exists"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "catalog"
)]
async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    tracing::debug!("Creating new product: {}", payload.name);

    // Validate the request using validator crate
    payload.validate()?;

    if validation::validate_positive_amount(payload.price).is_err() {
        let mut errors = validator::ValidationErrors::new();
        errors.add(
            "price",
            validator::ValidationError::new("amount_must_be_positive"),
        );
        return Err(ApiError::ValidationError(errors));
    }

    // Check for duplicate product name
    if db::check_duplicate_product(&state.db, &payload.name).await? {
        tracing::warn!("Attempt to create duplicate product: {}", payload.name);
        return Err(ApiError::Conflict {
            message: format!("Product with name '{}' already exists", payload.name),
        });
    }

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products
            (category_id, name, description, price, image_url, is_vegetarian, is_featured, is_active, display_order)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(payload.category_id)
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(&payload.image_url)
    .bind(payload.is_vegetarian)
    .bind(payload.is_featured)
    .bind(payload.is_active)
    .bind(payload.display_order)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Successfully created product with id: {}", product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for GET /api/products
/// Supports search, filtering, sorting, and pagination
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "List of products matching the query", body = Vec<Product>),
        (status = 400, description = "Invalid query parameters", body = String),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "catalog"
)]
async fn get_products(
    Query(params): Query<QueryParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    tracing::debug!("Fetching products with query parameters: {:?}", params);

    // 1. Validate query parameters
    let validated = QueryValidator::validate(params)
        .map_err(|_e| ApiError::ValidationError(validator::ValidationErrors::new()))?;

    // 2. Build SQL query
    let mut builder = query::SQLQueryBuilder::new();

    if let Some(search) = validated.search {
        builder.add_search_filter(&search);
    }
    if let Some(category_id) = validated.category {
        builder.add_category_filter(category_id);
    }
    if validated.active_only {
        builder.add_active_filter();
    }
    if validated.featured_only {
        builder.add_featured_filter();
    }
    if validated.vegetarian_only {
        builder.add_vegetarian_filter();
    }
    builder.add_price_range(validated.min_price, validated.max_price);

    if let Some(sort_field) = validated.sort_field {
        builder.set_sort(sort_field, validated.sort_order);
    } else {
        builder.set_sort(query::SortField::DisplayOrder, validated.sort_order);
    }

    builder.set_pagination(validated.page, validated.limit);

    let (query_str, params) = builder.build();

    // 3. Execute query using sqlx with parameterized binding
    let mut query = sqlx::query_as::<_, Product>(&query_str);

    for param in params {
        query = query.bind(param);
    }

    let products = query.fetch_all(&state.db).await?;

    tracing::debug!("Query returned {} products", products.len());
    Ok(Json(products))
}

/// Handler for GET /api/products/:id
/// Retrieves a specific product by ID
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found", body = String, example = json!({"error": "Product with id 1 not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "catalog"
)]
async fn get_product_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, ApiError> {
    tracing::debug!("Fetching product with id: {}", id);

    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| {
            tracing::debug!("Product with id {} not found", id);
            ApiError::NotFound {
                resource: "Product".to_string(),
                id: id.to_string(),
            }
        })?;

    tracing::debug!("Successfully retrieved product: {}", product.name);
    Ok(Json(product))
}

/// Handler for PUT /api/admin/products/:id
/// Updates an existing product
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, description = "Invalid input data", body = String),
        (status = 404, description = "Product not found", body = String, example = json!({"error": "Product with id 1 not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "catalog"
)]
async fn update_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProduct>,
) -> Result<Json<Product>, ApiError> {
    tracing::debug!("Updating product with id: {}", id);

    payload.validate()?;

    // A transaction keeps the existence check, duplicate check and the
    // update itself atomic
    let mut tx = state.db.begin().await?;

    let existing = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            tracing::debug!("Product with id {} not found for update", id);
            ApiError::NotFound {
                resource: "Product".to_string(),
                id: id.to_string(),
            }
        })?;

    // If the name changes, reject collisions with other products
    if let Some(ref new_name) = payload.name {
        if new_name != &existing.name {
            let duplicate_exists: Option<bool> = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM products WHERE name = $1 AND id != $2)",
            )
            .bind(new_name)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if duplicate_exists.unwrap_or(false) {
                tracing::warn!("Attempt to update product {} to duplicate name: {}", id, new_name);
                return Err(ApiError::Conflict {
                    message: format!("Product with name '{}' already exists", new_name),
                });
            }
        }
    }

    let updated_product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET category_id = $1,
            name = $2,
            description = $3,
            price = $4,
            image_url = $5,
            is_vegetarian = $6,
            is_featured = $7,
            is_active = $8,
            display_order = $9,
            updated_at = NOW()
        WHERE id = $10
        RETURNING *
        "#,
    )
    .bind(payload.category_id.or(existing.category_id))
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.description.or(existing.description))
    .bind(payload.price.unwrap_or(existing.price))
    .bind(payload.image_url.or(existing.image_url))
    .bind(payload.is_vegetarian.unwrap_or(existing.is_vegetarian))
    .bind(payload.is_featured.unwrap_or(existing.is_featured))
    .bind(payload.is_active.unwrap_or(existing.is_active))
    .bind(payload.display_order.unwrap_or(existing.display_order))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Successfully updated product with id: {}", id);
    Ok(Json(updated_product))
}

/// Handler for DELETE /api/admin/products/:id
/// Deletes a product
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 404, description = "Product not found", body = String, example = json!({"error": "Product with id 1 not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "catalog"
)]
async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    tracing::debug!("Deleting product with id: {}", id);

    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        tracing::debug!("Product with id {} not found for deletion", id);
        return Err(ApiError::NotFound {
            resource: "Product".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Successfully deleted product with id: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/categories
/// Active categories ordered for display
async fn get_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE is_active = TRUE ORDER BY display_order, id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(categories))
}

/// Handler for GET /api/admin/categories
/// Every category, including inactive ones
async fn get_all_categories(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY display_order, id")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(categories))
}

/// Handler for POST /api/admin/categories
async fn create_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    payload.validate()?;

    if db::check_duplicate_category(&state.db, &payload.name).await? {
        return Err(ApiError::Conflict {
            message: format!("Category with name '{}' already exists", payload.name),
        });
    }

    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, description, image_url, display_order, is_active)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(&payload.image_url)
    .bind(payload.display_order)
    .bind(payload.is_active)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Successfully created category with id: {}", category.id);
    Ok((StatusCode::CREATED, Json(category)))
}

/// Handler for PUT /api/admin/categories/:id
async fn update_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCategory>,
) -> Result<Json<Category>, ApiError> {
    payload.validate()?;

    let existing = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Category".to_string(),
            id: id.to_string(),
        })?;

    let updated = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = $1,
            description = $2,
            image_url = $3,
            display_order = $4,
            is_active = $5,
            updated_at = NOW()
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.description.or(existing.description))
    .bind(payload.image_url.or(existing.image_url))
    .bind(payload.display_order.unwrap_or(existing.display_order))
    .bind(payload.is_active.unwrap_or(existing.is_active))
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// Handler for DELETE /api/admin/categories/:id
async fn delete_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "Category".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Auth
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/refresh", post(auth::refresh_handler))
        .route("/api/auth/me", get(auth::me_handler))
        // Catalog (public)
        .route("/api/products", get(get_products))
        .route("/api/products/:id", get(get_product_by_id))
        .route("/api/products/:id/prices", get(pizza::product_prices_handler))
        .route("/api/categories", get(get_categories))
        // Pizza builder (public)
        .route("/api/pizza/sizes", get(pizza::list_sizes_handler))
        .route("/api/pizza/borders", get(pizza::list_borders_handler))
        .route("/api/pizza/quote", post(pizza::quote_handler))
        // Promotions (public)
        .route("/api/coupons", get(coupons::list_coupons_handler))
        .route("/api/coupons/validate", post(coupons::validate_coupon_handler))
        .route("/api/delivery/zones", get(delivery::list_zones_handler))
        .route("/api/delivery/resolve", post(delivery::resolve_zone_handler))
        // Loyalty (customer)
        .route("/api/loyalty/points", get(loyalty::balance_handler))
        .route("/api/loyalty/transactions", get(loyalty::transactions_handler))
        .route("/api/loyalty/rewards", get(loyalty::list_rewards_handler))
        .route("/api/loyalty/redeem", post(loyalty::redeem_handler))
        // Orders (customer)
        .route("/api/orders", post(orders::create_order_handler))
        .route("/api/orders", get(orders::get_my_orders_handler))
        .route("/api/orders/:order_id", get(orders::get_order_by_id_handler))
        .route("/api/orders/:order_id/history", get(orders::order_history_handler))
        .route("/api/orders/:order_id/whatsapp", get(orders::order_whatsapp_handler))
        // Settings (public)
        .route("/api/settings", get(settings::get_settings_handler))
        // Back office
        .route("/api/admin/products", post(create_product))
        .route("/api/admin/products/:id", put(update_product))
        .route("/api/admin/products/:id", delete(delete_product))
        .route("/api/admin/categories", get(get_all_categories))
        .route("/api/admin/categories", post(create_category))
        .route("/api/admin/categories/:id", put(update_category))
        .route("/api/admin/categories/:id", delete(delete_category))
        .route("/api/admin/pizza/sizes", get(pizza::list_all_sizes_handler))
        .route("/api/admin/pizza/sizes", post(pizza::create_size_handler))
        .route("/api/admin/pizza/sizes/:id", put(pizza::update_size_handler))
        .route("/api/admin/pizza/sizes/:id", delete(pizza::delete_size_handler))
        .route("/api/admin/pizza/borders", get(pizza::list_all_borders_handler))
        .route("/api/admin/pizza/borders", post(pizza::create_border_handler))
        .route("/api/admin/pizza/borders/:id", put(pizza::update_border_handler))
        .route("/api/admin/pizza/borders/:id", delete(pizza::delete_border_handler))
        .route("/api/admin/product-prices", post(pizza::upsert_price_handler))
        .route(
            "/api/admin/product-prices/:product_id/:size_id",
            delete(pizza::delete_price_handler),
        )
        .route("/api/admin/coupons", get(coupons::list_all_coupons_handler))
        .route("/api/admin/coupons", post(coupons::create_coupon_handler))
        .route("/api/admin/coupons/:id", put(coupons::update_coupon_handler))
        .route("/api/admin/coupons/:id", delete(coupons::delete_coupon_handler))
        .route("/api/admin/coupons/:id/uses", get(coupons::coupon_uses_handler))
        .route("/api/admin/delivery/zones", get(delivery::list_all_zones_handler))
        .route("/api/admin/delivery/zones", post(delivery::create_zone_handler))
        .route("/api/admin/delivery/zones/:id", put(delivery::update_zone_handler))
        .route("/api/admin/delivery/zones/:id", delete(delivery::delete_zone_handler))
        .route("/api/admin/loyalty/rewards", get(loyalty::list_all_rewards_handler))
        .route("/api/admin/loyalty/rewards", post(loyalty::create_reward_handler))
        .route("/api/admin/loyalty/rewards/:id", put(loyalty::update_reward_handler))
        .route("/api/admin/loyalty/rewards/:id", delete(loyalty::delete_reward_handler))
        .route("/api/admin/orders", get(orders::list_orders_handler))
        .route("/api/admin/orders/:order_id/advance", post(orders::advance_order_handler))
        .route("/api/admin/orders/:order_id/status", patch(orders::set_order_status_handler))
        .route("/api/admin/settings", put(settings::upsert_setting_handler))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Pizzeria API - Starting...");

    // Get configuration from environment variables
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Create the application router
    let app = create_router(AppState::new(db_pool));

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Pizzeria API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests;
