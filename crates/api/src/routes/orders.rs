//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{OrderId, Version};
use domain::{
    AddItem, ApplyCoupon, CancelOrder, ChangeStatus, CommandResult, Coupon, CreateOrder,
    CustomerSnapshot, DomainEvent, Money, Order, OrderDetails, OrderError, OrderItem, OrderQuery,
    OrderRepository, OrderService, OrderStatus, OrderType, ProductSnapshot, RemoveItem,
    ReplaceOrder, RestaurantSnapshot, UpdateDeliveryFee,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R: OrderRepository> {
    pub order_service: OrderService<R>,
}

impl<R: OrderRepository> AppState<R> {
    pub fn new(repository: R) -> Self {
        Self {
            order_service: OrderService::new(repository),
        }
    }
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct PartyRequest {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    #[serde(default)]
    pub product_description: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    #[serde(default)]
    pub addons_value_cents: i64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: String,
    #[serde(default)]
    pub discount_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub code: String,
    #[serde(default)]
    pub ordered_at: Option<DateTime<Utc>>,
    pub customer: PartyRequest,
    pub restaurant: PartyRequest,
    pub order_type: OrderType,
    #[serde(default)]
    pub delivery_fee_cents: i64,
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub coupon: Option<CouponRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceOrderRequest {
    pub version: i64,
    pub customer: PartyRequest,
    pub restaurant: PartyRequest,
    pub order_type: OrderType,
    #[serde(default)]
    pub delivery_fee_cents: i64,
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub coupon: Option<CouponRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: OrderStatus,
    pub version: i64,
}

#[derive(Debug, Deserialize)]
pub struct VersionRequest {
    pub version: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub version: i64,
    #[serde(flatten)]
    pub item: OrderItemRequest,
}

#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub version: i64,
    #[serde(flatten)]
    pub coupon: CouponRequest,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryFeeRequest {
    pub version: i64,
    pub delivery_fee_cents: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub code: Option<String>,
    pub status: Option<OrderStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct PartyResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_description: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub addons_value_cents: i64,
    pub note: Option<String>,
    pub line_total_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub code: String,
    pub discount_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub code: String,
    pub ordered_at: DateTime<Utc>,
    pub customer: PartyResponse,
    pub restaurant: PartyResponse,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub items: Vec<OrderItemResponse>,
    pub delivery_fee_cents: i64,
    pub coupon: Option<CouponResponse>,
    pub items_subtotal_cents: i64,
    pub discount_value_cents: i64,
    pub total_cents: i64,
    pub version: i64,
}

/// An order after a command, with the event types it raised.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub order: OrderResponse,
    pub events: Vec<&'static str>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            code: order.code().to_string(),
            ordered_at: order.created_at(),
            customer: PartyResponse {
                id: order.customer().id().to_string(),
                name: order.customer().name().to_string(),
            },
            restaurant: PartyResponse {
                id: order.restaurant().id().to_string(),
                name: order.restaurant().name().to_string(),
            },
            order_type: order.order_type(),
            status: order.status(),
            items: order
                .items()
                .iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id().to_string(),
                    product_description: item.product().description().to_string(),
                    quantity: item.quantity(),
                    unit_price_cents: item.unit_price().cents(),
                    addons_value_cents: item.addons_value().cents(),
                    note: item.note().map(String::from),
                    line_total_cents: item.line_total().cents(),
                })
                .collect(),
            delivery_fee_cents: order.delivery_fee().cents(),
            coupon: order.coupon().map(|coupon| CouponResponse {
                code: coupon.code().to_string(),
                discount_cents: coupon.discount().cents(),
            }),
            items_subtotal_cents: order.items_subtotal().cents(),
            discount_value_cents: order.discount_value().cents(),
            total_cents: order.order_total().cents(),
            version: order.version().as_i64(),
        }
    }
}

impl From<CommandResult> for CommandResponse {
    fn from(result: CommandResult) -> Self {
        Self {
            order: OrderResponse::from(&result.aggregate),
            events: result.events.iter().map(|e| e.event_type()).collect(),
        }
    }
}

// -- Request conversion --

impl OrderItemRequest {
    fn into_item(self) -> Result<OrderItem, OrderError> {
        OrderItem::new(
            ProductSnapshot::new(self.product_id, self.product_description)?,
            self.quantity,
            Money::from_cents(self.unit_price_cents),
            Money::from_cents(self.addons_value_cents),
            self.note,
        )
    }
}

impl CouponRequest {
    fn into_coupon(self) -> Result<Coupon, OrderError> {
        Coupon::new(self.code, Money::from_cents(self.discount_cents))
    }
}

fn into_items(items: Vec<OrderItemRequest>) -> Result<Vec<OrderItem>, OrderError> {
    items.into_iter().map(OrderItemRequest::into_item).collect()
}

fn into_coupon(coupon: Option<CouponRequest>) -> Result<Option<Coupon>, OrderError> {
    coupon.map(CouponRequest::into_coupon).transpose()
}

impl CreateOrderRequest {
    fn into_details(self) -> Result<OrderDetails, OrderError> {
        Ok(OrderDetails {
            code: self.code,
            created_at: self.ordered_at.unwrap_or_else(Utc::now),
            customer: CustomerSnapshot::new(self.customer.id, self.customer.name)?,
            restaurant: RestaurantSnapshot::new(self.restaurant.id, self.restaurant.name)?,
            order_type: self.order_type,
            delivery_fee: Money::from_cents(self.delivery_fee_cents),
            items: into_items(self.items)?,
            coupon: into_coupon(self.coupon)?,
        })
    }
}

impl ReplaceOrderRequest {
    fn into_command(self, order_id: OrderId) -> Result<ReplaceOrder, OrderError> {
        Ok(ReplaceOrder {
            order_id,
            expected_version: Version::new(self.version),
            customer: CustomerSnapshot::new(self.customer.id, self.customer.name)?,
            restaurant: RestaurantSnapshot::new(self.restaurant.id, self.restaurant.name)?,
            order_type: self.order_type,
            delivery_fee: Money::from_cents(self.delivery_fee_cents),
            items: into_items(self.items)?,
            coupon: into_coupon(self.coupon)?,
        })
    }
}

// -- Handlers --

/// POST /orders — place a new order.
#[tracing::instrument(skip(state, req), fields(code = %req.code))]
pub async fn create<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let details = req.into_details()?;
    let result = state
        .order_service
        .create_order(CreateOrder::new(details))
        .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// GET /orders — search orders by code, status and placement window.
#[tracing::instrument(skip(state))]
pub async fn search<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let mut query = OrderQuery::new();
    if let Some(code) = params.code {
        query = query.code(code);
    }
    if let Some(status) = params.status {
        query = query.status(status);
    }
    if let Some(from) = params.from {
        query = query.from(from);
    }
    if let Some(to) = params.to {
        query = query.to(to);
    }

    let orders = state.order_service.search_orders(&query).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /orders/{id} — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.get_order(order_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// GET /orders/code/{code} — load an order by code.
#[tracing::instrument(skip(state))]
pub async fn get_by_code<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(code): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.order_service.get_order_by_code(&code).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /orders/{id} — replace the editable fields of an order.
#[tracing::instrument(skip(state, req))]
pub async fn replace<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<ReplaceOrderRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let cmd = req.into_command(order_id)?;
    let result = state.order_service.replace_order(cmd).await?;
    Ok(Json(result.into()))
}

/// DELETE /orders/{id} — delete an order by ID.
#[tracing::instrument(skip(state))]
pub async fn delete<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id = parse_order_id(&id)?;
    state.order_service.delete_order(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /orders/code/{code} — delete an order by code.
#[tracing::instrument(skip(state))]
pub async fn delete_by_code<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.order_service.delete_order_by_code(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /orders/{id}/status — move an order to another status.
#[tracing::instrument(skip(state))]
pub async fn change_status<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let result = state
        .order_service
        .change_status(ChangeStatus::new(
            order_id,
            Version::new(req.version),
            req.status,
        ))
        .await?;
    Ok(Json(result.into()))
}

/// POST /orders/{id}/cancel — cancel an order.
#[tracing::instrument(skip(state))]
pub async fn cancel<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<VersionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let result = state
        .order_service
        .cancel_order(CancelOrder::new(order_id, Version::new(req.version)))
        .await?;
    Ok(Json(result.into()))
}

/// POST /orders/{id}/items — append an item.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let item = req.item.into_item()?;
    let result = state
        .order_service
        .add_item(AddItem::new(order_id, Version::new(req.version), item))
        .await?;
    Ok(Json(result.into()))
}

/// DELETE /orders/{id}/items/{product_id}?version=N — remove the first item
/// for a product.
#[tracing::instrument(skip(state))]
pub async fn remove_item<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path((id, product_id)): Path<(String, String)>,
    Query(params): Query<VersionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let result = state
        .order_service
        .remove_item(RemoveItem::new(
            order_id,
            Version::new(params.version),
            product_id,
        ))
        .await?;
    Ok(Json(result.into()))
}

/// POST /orders/{id}/coupon — attach a coupon.
#[tracing::instrument(skip(state, req))]
pub async fn apply_coupon<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<ApplyCouponRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let coupon = req.coupon.into_coupon()?;
    let result = state
        .order_service
        .apply_coupon(ApplyCoupon::new(order_id, Version::new(req.version), coupon))
        .await?;
    Ok(Json(result.into()))
}

/// PUT /orders/{id}/delivery-fee — change the delivery fee.
#[tracing::instrument(skip(state))]
pub async fn update_delivery_fee<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDeliveryFeeRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let result = state
        .order_service
        .update_delivery_fee(UpdateDeliveryFee::new(
            order_id,
            Version::new(req.version),
            Money::from_cents(req.delivery_fee_cents),
        ))
        .await?;
    Ok(Json(result.into()))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(OrderId::from(uuid))
}
