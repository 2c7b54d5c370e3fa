use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::coupons::models::CouponQuote;
use crate::coupons::service::CouponService;
use crate::delivery::models::DeliveryZone;
use crate::delivery::repository::DeliveryZoneRepository;
use crate::loyalty::ledger::Accrual;
use crate::loyalty::service::LoyaltyService;
use crate::orders::checkout;
use crate::orders::error::OrderError;
use crate::orders::events::{OrderEvent, OrderEvents};
use crate::orders::models::{
    CreateOrderRequest, NewOrder, NewOrderItem, Order, OrderItemRequest, OrderResponse,
    OrderStatus, OrderStatusHistory, OrderType,
};
use crate::orders::repository::{OrderItemsRepository, OrdersRepository, ProductRepository};
use crate::orders::status_machine::StatusMachine;
use crate::pizza::builder;
use crate::pizza::error::PizzaError;
use crate::pizza::models::PizzaQuoteRequest;
use crate::pizza::repository::PizzaOptionsRepository;
use crate::settings::SettingsStore;

/// Service for order business logic
#[derive(Clone)]
pub struct OrderService {
    orders_repo: OrdersRepository,
    order_items_repo: OrderItemsRepository,
    product_repo: ProductRepository,
    pizza_repo: PizzaOptionsRepository,
    zones_repo: DeliveryZoneRepository,
    coupon_service: CouponService,
    loyalty_service: LoyaltyService,
    settings: SettingsStore,
    events: OrderEvents,
}

impl OrderService {
    /// Create a new OrderService
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        orders_repo: OrdersRepository,
        order_items_repo: OrderItemsRepository,
        product_repo: ProductRepository,
        pizza_repo: PizzaOptionsRepository,
        zones_repo: DeliveryZoneRepository,
        coupon_service: CouponService,
        loyalty_service: LoyaltyService,
        settings: SettingsStore,
        events: OrderEvents,
    ) -> Self {
        Self {
            orders_repo,
            order_items_repo,
            product_repo,
            pizza_repo,
            zones_repo,
            coupon_service,
            loyalty_service,
            settings,
            events,
        }
    }

    /// Place an order
    ///
    /// Resolves every cart line server-side (snapshotting unit prices),
    /// validates the coupon against the subtotal, resolves the delivery
    /// fee, persists the order atomically, then runs the post-commit
    /// steps: coupon application and loyalty accrual, both best-effort —
    /// a committed order stands even when those fail.
    pub async fn place_order(
        &self,
        user_id: Option<i32>,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, OrderError> {
        if request.items.is_empty() {
            return Err(OrderError::ValidationError(
                "Order must contain at least one item".to_string(),
            ));
        }

        let mut lines = Vec::with_capacity(request.items.len());
        for item in &request.items {
            lines.push(self.resolve_line(item).await?);
        }

        let line_totals: Vec<Decimal> = lines.iter().map(|line| line.subtotal).collect();
        let subtotal = checkout::subtotal(&line_totals);

        let coupon_quote = match request.coupon_code.as_deref() {
            Some(code) => Some(
                self.coupon_service
                    .validate(code, subtotal, user_id)
                    .await?,
            ),
            None => None,
        };
        let discount = coupon_quote
            .as_ref()
            .map(|quote| quote.discount)
            .unwrap_or(Decimal::ZERO);

        let zone = self.resolve_zone(&request).await?;
        let config = self.settings.checkout_config().await?;
        let summary = checkout::summarize(
            subtotal,
            discount,
            request.order_type,
            zone.as_ref(),
            &config,
        );

        let order = self
            .orders_repo
            .create(
                NewOrder {
                    user_id,
                    customer_name: request.customer_name.clone(),
                    customer_phone: request.customer_phone.clone(),
                    customer_address: request.customer_address.clone(),
                    order_type: request.order_type,
                    delivery_zone_id: zone.as_ref().map(|z| z.id),
                    subtotal: summary.subtotal,
                    discount: summary.discount,
                    delivery_fee: summary.delivery_fee,
                    total_amount: summary.total,
                    payment_method: request.payment_method.clone(),
                    change_for: request.change_for,
                    notes: request.notes.clone(),
                },
                lines,
            )
            .await?;

        self.run_post_commit_steps(&order, user_id, coupon_quote).await;

        self.events.publish(OrderEvent {
            order_id: order.id,
            status: order.status,
        });

        let items = self.order_items_repo.find_by_order_id(order.id).await?;
        Ok(OrderResponse::from_parts(order, items))
    }

    /// Coupon application and loyalty accrual after the order committed
    ///
    /// Failures here are logged and swallowed: the order stands, the
    /// coupon use or points are simply not recorded.
    async fn run_post_commit_steps(
        &self,
        order: &Order,
        user_id: Option<i32>,
        coupon_quote: Option<CouponQuote>,
    ) {
        let user_id = match user_id {
            Some(user_id) => user_id,
            None => return,
        };

        if let Some(quote) = coupon_quote {
            if let Err(e) = self
                .coupon_service
                .apply(quote.coupon.id, user_id, Some(order.id))
                .await
            {
                tracing::warn!(
                    "Failed to record coupon use for order {}: {}",
                    order.id,
                    e
                );
            }
        }

        match self
            .loyalty_service
            .earn(
                user_id,
                Some(order.id),
                Accrual::FromTotal(order.total_amount),
                None,
            )
            .await
        {
            Ok(points) if points > 0 => {
                tracing::info!(
                    "Awarded {} loyalty points to user {} for order {}",
                    points,
                    user_id,
                    order.id
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    "Failed to award loyalty points for order {}: {}",
                    order.id,
                    e
                );
            }
        }
    }

    /// Resolve one cart line into a priced snapshot
    async fn resolve_line(&self, item: &OrderItemRequest) -> Result<NewOrderItem, OrderError> {
        if item.quantity <= 0 {
            return Err(OrderError::InvalidQuantity(format!(
                "Quantity must be positive, got {}",
                item.quantity
            )));
        }

        let (product_id, product_name, unit_price) = match (&item.pizza, item.product_id) {
            (Some(pizza), _) => {
                let (name, price) = self.resolve_pizza_line(pizza).await?;
                (None, name, price)
            }
            (None, Some(product_id)) => {
                let product = self
                    .product_repo
                    .find_active_by_id(product_id)
                    .await?
                    .ok_or(OrderError::ProductNotFound(product_id))?;

                match item.size_id {
                    Some(size_id) => {
                        let size = self
                            .pizza_repo
                            .find_size(size_id)
                            .await?
                            .filter(|s| s.is_active)
                            .ok_or(PizzaError::SizeNotFound(size_id))?;

                        let price = match self.pizza_repo.find_price(product.id, size.id).await? {
                            Some(row) => row.price,
                            None => product.price,
                        };

                        let name = format!("{} ({})", product.name, size.name);
                        (Some(product.id), name, price)
                    }
                    None => (Some(product.id), product.name.clone(), product.price),
                }
            }
            (None, None) => {
                return Err(OrderError::ValidationError(
                    "Each item must reference a product or a composed pizza".to_string(),
                ));
            }
        };

        let subtotal = checkout::line_total(item.quantity, unit_price);

        Ok(NewOrderItem {
            product_id,
            product_name,
            quantity: item.quantity,
            unit_price,
            subtotal,
        })
    }

    /// Price a composed pizza through the composition engine
    async fn resolve_pizza_line(
        &self,
        request: &PizzaQuoteRequest,
    ) -> Result<(String, Decimal), OrderError> {
        let size = self
            .pizza_repo
            .find_size(request.size_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or(PizzaError::SizeNotFound(request.size_id))?;

        let border = match request.border_id {
            Some(border_id) => Some(
                self.pizza_repo
                    .find_border(border_id)
                    .await?
                    .filter(|b| b.is_active)
                    .ok_or(PizzaError::BorderNotFound(border_id))?,
            ),
            None => None,
        };

        let products = self
            .product_repo
            .find_active_by_ids(&request.flavor_product_ids)
            .await?;
        let product_map: HashMap<i32, crate::models::Product> =
            products.into_iter().map(|p| (p.id, p)).collect();

        let mut flavors = Vec::with_capacity(request.flavor_product_ids.len());
        for product_id in &request.flavor_product_ids {
            let product = product_map
                .get(product_id)
                .cloned()
                .ok_or(PizzaError::FlavorNotFound(*product_id))?;
            flavors.push(product);
        }

        let overrides = self
            .pizza_repo
            .prices_for_products(&request.flavor_product_ids)
            .await?;

        let (selection, total) = builder::price_composition(size, border, flavors, &overrides)?;

        let flavor_names: Vec<&str> = selection
            .flavors()
            .iter()
            .map(|f| f.product.name.as_str())
            .collect();
        let mut name = format!(
            "Pizza {}: {}",
            selection.size().map(|s| s.name.as_str()).unwrap_or(""),
            flavor_names.join(" + ")
        );
        if let Some(border) = selection.border() {
            name.push_str(&format!(" (borda {})", border.name));
        }

        Ok((name, total))
    }

    /// Resolve the delivery zone for a delivery order, if one was chosen
    async fn resolve_zone(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<Option<DeliveryZone>, OrderError> {
        if request.order_type != OrderType::Delivery {
            return Ok(None);
        }

        match request.delivery_zone_id {
            Some(zone_id) => {
                let zone = self
                    .zones_repo
                    .find_by_id(zone_id)
                    .await?
                    .filter(|z| z.is_active)
                    .ok_or(crate::delivery::error::DeliveryError::ZoneNotFound(zone_id))?;
                Ok(Some(zone))
            }
            None => Ok(None),
        }
    }

    /// Get all orders with an optional status filter (back office)
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderResponse>, OrderError> {
        let orders = self.orders_repo.list(status).await?;
        self.with_items(orders).await
    }

    /// Get the authenticated user's order history
    pub async fn get_user_orders(&self, user_id: i32) -> Result<Vec<OrderResponse>, OrderError> {
        let orders = self.orders_repo.list_by_user(user_id).await?;
        self.with_items(orders).await
    }

    /// Get a specific order, enforcing ownership unless `is_admin`
    pub async fn get_order_by_id(
        &self,
        order_id: Uuid,
        user_id: Option<i32>,
        is_admin: bool,
    ) -> Result<OrderResponse, OrderError> {
        let (order, items) = self.order_parts(order_id, user_id, is_admin).await?;
        Ok(OrderResponse::from_parts(order, items))
    }

    /// Raw order row and items, with the same ownership rule
    pub async fn order_parts(
        &self,
        order_id: Uuid,
        user_id: Option<i32>,
        is_admin: bool,
    ) -> Result<(Order, Vec<crate::orders::models::OrderItem>), OrderError> {
        let order = self
            .orders_repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !is_admin && order.user_id != user_id {
            return Err(OrderError::Forbidden(
                "You do not have permission to access this order".to_string(),
            ));
        }

        let items = self.order_items_repo.find_by_order_id(order.id).await?;
        Ok((order, items))
    }

    /// The status audit trail of one order
    pub async fn status_history(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderStatusHistory>, OrderError> {
        // A missing order must 404, not read as an empty trail
        self.orders_repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        self.orders_repo.status_history(order_id).await
    }

    /// Guarded quick action: advance one step along the linear chain
    ///
    /// Rejected at terminal states; every successful advance appends a
    /// history row and notifies subscribers.
    pub async fn advance_status(
        &self,
        order_id: Uuid,
        notes: Option<&str>,
        changed_by: Option<i32>,
    ) -> Result<Order, OrderError> {
        let order = self
            .orders_repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        let next = StatusMachine::advance(order.status).map_err(OrderError::InvalidTransition)?;

        let updated = self
            .orders_repo
            .update_status(order_id, next, notes, changed_by)
            .await?;

        self.events.publish(OrderEvent {
            order_id,
            status: next,
        });

        Ok(updated)
    }

    /// Unguarded admin override: set any status directly
    ///
    /// Deliberately skips the transition table (operator escape hatch);
    /// still appends to the audit trail and notifies subscribers.
    pub async fn force_set_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        notes: Option<&str>,
        changed_by: Option<i32>,
    ) -> Result<Order, OrderError> {
        self.orders_repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        let updated = self
            .orders_repo
            .update_status(order_id, new_status, notes, changed_by)
            .await?;

        self.events.publish(OrderEvent {
            order_id,
            status: new_status,
        });

        Ok(updated)
    }

    /// Subscribe to order change events
    pub fn subscribe(&self) -> crate::orders::events::OrderSubscription {
        self.events.subscribe()
    }

    async fn with_items(&self, orders: Vec<Order>) -> Result<Vec<OrderResponse>, OrderError> {
        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.order_items_repo.find_by_order_id(order.id).await?;
            responses.push(OrderResponse::from_parts(order, items));
        }

        Ok(responses)
    }
}
