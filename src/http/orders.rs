//! Order route handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AdminUser, CurrentUser};
use crate::domain::{Order, OrderItem, PaymentConfirmation, ShippingAddress};
use crate::error::{ApiError, Result};
use crate::http::AppState;
use crate::store::UserRef;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(rename = "orderItems", alias = "items", default)]
    #[validate]
    pub order_items: Vec<OrderItem>,
    #[validate]
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    #[serde(default)]
    pub tax_price: Option<Value>,
    #[serde(default)]
    pub shipping_price: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShippingStatusRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub delivered: bool,
    pub paid: bool,
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    req.validate().map_err(|e| ApiError::Validation(e.to_string()))?;
    let order = state
        .orders
        .create_order(user.id, req.order_items, req.shipping_address, req.payment_method, req.tax_price, req.shipping_price)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let (order, user) = state.orders.get_order(id).await?;
    let user = user.map(|u| json!({"id": u.id, "name": u.name, "email": u.email}));
    Ok(Json(populated(&order, user)?))
}

/// PUT /api/orders/:id/pay
pub async fn pay_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(confirmation): Json<PaymentConfirmation>,
) -> Result<Json<Order>> {
    let order = state.orders.pay_order(id, confirmation).await?;
    Ok(Json(order))
}

/// PUT /api/orders/:id/deliver
pub async fn deliver_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>> {
    let order = state.orders.deliver_order(id).await?;
    Ok(Json(order))
}

/// GET /api/orders/myorders
pub async fn my_orders(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<Order>>> {
    let orders = state.orders.orders_for_user(user.id).await?;
    Ok(Json(orders))
}

/// GET /api/orders
pub async fn list_all_orders(State(state): State<AppState>, _admin: AdminUser) -> Result<Json<Vec<Value>>> {
    let orders = state.orders.all_orders().await?;
    orders
        .iter()
        .map(|(order, user)| {
            let user = user.as_ref().map(|u: &UserRef| json!({"id": u.id, "name": u.name}));
            populated(order, user)
        })
        .collect::<Result<Vec<_>>>()
        .map(Json)
}

/// POST /api/orders/update-shipping-status
pub async fn update_shipping_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<UpdateShippingStatusRequest>,
) -> Result<Json<Value>> {
    let order = state.orders.deliver_order(req.order_id).await?;
    Ok(Json(json!({
        "message": "Shipping status updated to Delivered",
        "updatedOrder": order,
    })))
}

/// POST /api/orders/update-order/:orderId
pub async fn update_order_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Value>> {
    let order = state.orders.set_order_status(order_id, req.delivered, req.paid).await?;
    Ok(Json(json!({
        "message": "Order updated successfully",
        "order": order,
    })))
}

/// Replaces the serialized `user` id with the resolved display fields, the
/// way the admin and detail views expect the owner to appear.
fn populated(order: &Order, user: Option<Value>) -> Result<Value> {
    let mut doc = serde_json::to_value(order).map_err(|e| ApiError::Storage(e.to_string()))?;
    if let (Some(obj), Some(user)) = (doc.as_object_mut(), user) {
        obj.insert("user".to_string(), user);
    }
    Ok(doc)
}
