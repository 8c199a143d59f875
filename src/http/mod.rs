//! HTTP surface of the order service.

use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::sync::Arc;

use crate::service::OrderService;

pub mod orders;

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/orders", post(orders::create_order).get(orders::list_all_orders))
        .route("/api/orders/myorders", get(orders::my_orders))
        .route("/api/orders/update-shipping-status", post(orders::update_shipping_status))
        .route("/api/orders/update-order/:order_id", post(orders::update_order_status))
        .route("/api/orders/:id", get(orders::get_order))
        .route("/api/orders/:id/pay", put(orders::pay_order))
        .route("/api/orders/:id/deliver", put(orders::deliver_order))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "storefront-orders"}))
}
