//! Route-level tests driven through the router with an in-memory store.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use storefront_orders::http::{router, AppState};
use storefront_orders::service::OrderService;
use storefront_orders::store::{MemoryOrderStore, UserRef};

fn app() -> (Arc<MemoryOrderStore>, Router) {
    let store = Arc::new(MemoryOrderStore::new());
    let state = AppState { orders: Arc::new(OrderService::new(store.clone())) };
    (store, router(state))
}

struct Caller {
    id: Uuid,
    admin: bool,
}

impl Caller {
    fn user() -> Self {
        Self { id: Uuid::new_v4(), admin: false }
    }

    fn admin() -> Self {
        Self { id: Uuid::new_v4(), admin: true }
    }
}

async fn send(app: &Router, method: Method, uri: &str, caller: Option<&Caller>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    if let Some(caller) = caller {
        builder = builder.header("x-user-id", caller.id.to_string());
        if caller.admin {
            builder = builder.header("x-user-admin", "true");
        }
    }
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn order_payload() -> Value {
    json!({
        "orderItems": [
            {"product": Uuid::new_v4(), "name": "Widget", "qty": 2, "price": 10, "image": "/images/widget.jpg"}
        ],
        "shippingAddress": {"address": "1 Main St", "city": "Lagos", "postalCode": "100001", "country": "NG"},
        "paymentMethod": "PayPal",
        "taxPrice": "5",
        "shippingPrice": "3"
    })
}

#[tokio::test]
async fn test_create_requires_identity() {
    let (_store, app) = app();
    let (status, body) = send(&app, Method::POST, "/api/orders", None, Some(order_payload())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized");
}

#[tokio::test]
async fn test_create_order_prices_and_pays() {
    let (_store, app) = app();
    let caller = Caller::user();
    let (status, body) = send(&app, Method::POST, "/api/orders", Some(&caller), Some(order_payload())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["itemsPrice"].as_f64(), Some(20.0));
    assert_eq!(body["taxPrice"].as_f64(), Some(5.0));
    assert_eq!(body["shippingPrice"].as_f64(), Some(3.0));
    assert_eq!(body["totalPrice"].as_f64(), Some(28.0));
    assert_eq!(body["totalAmount"].as_f64(), Some(28.0));
    assert_eq!(body["user"], caller.id.to_string());
    assert_eq!(body["isPaid"], true);
    assert!(body["paidAt"].is_string());
    assert_eq!(body["isDelivered"], false);
}

#[tokio::test]
async fn test_create_cod_order_starts_unpaid() {
    let (_store, app) = app();
    let caller = Caller::user();
    let payload = json!({
        "orderItems": [
            {"product": Uuid::new_v4(), "name": "Widget", "qty": 1, "price": 7, "image": "/images/widget.jpg"}
        ],
        "shippingAddress": {"address": "1 Main St", "city": "Lagos", "postalCode": "100001", "country": "NG"},
        "paymentMethod": "COD"
    });
    let (status, body) = send(&app, Method::POST, "/api/orders", Some(&caller), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["taxPrice"].as_f64(), Some(0.0));
    assert_eq!(body["shippingPrice"].as_f64(), Some(0.0));
    assert_eq!(body["totalPrice"].as_f64(), Some(7.0));
    assert_eq!(body["isPaid"], false);
    assert!(body["paidAt"].is_null());
}

#[tokio::test]
async fn test_create_with_no_items_is_rejected() {
    let (store, app) = app();
    let caller = Caller::user();
    let payload = json!({
        "orderItems": [],
        "shippingAddress": {"address": "1 Main St", "city": "Lagos", "postalCode": "100001", "country": "NG"},
        "paymentMethod": "PayPal"
    });
    let (status, body) = send(&app, Method::POST, "/api/orders", Some(&caller), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No order items provided");
    assert_eq!(store.order_count().await, 0);
}

#[tokio::test]
async fn test_get_order_resolves_owner() {
    let (store, app) = app();
    let caller = Caller::user();
    store
        .add_user(UserRef { id: caller.id, name: "Ada".into(), email: "ada@example.com".into() })
        .await;
    let (_, created) = send(&app, Method::POST, "/api/orders", Some(&caller), Some(order_payload())).await;

    let uri = format!("/api/orders/{}", created["id"].as_str().unwrap());
    let (status, body) = send(&app, Method::GET, &uri, Some(&caller), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_get_unknown_order_is_404() {
    let (_store, app) = app();
    let caller = Caller::user();
    let uri = format!("/api/orders/{}", Uuid::new_v4());
    let (status, body) = send(&app, Method::GET, &uri, Some(&caller), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Order not found");
}

#[tokio::test]
async fn test_pay_order_mirrors_confirmation() {
    let (_store, app) = app();
    let caller = Caller::user();
    let (_, created) = send(&app, Method::POST, "/api/orders", Some(&caller), Some(order_payload())).await;

    let uri = format!("/api/orders/{}/pay", created["id"].as_str().unwrap());
    let confirmation = json!({
        "id": "PAY-123",
        "status": "COMPLETED",
        "update_time": "2024-05-01T10:00:00Z",
        "payer": {"email_address": "buyer@example.com"}
    });
    let (status, body) = send(&app, Method::PUT, &uri, Some(&caller), Some(confirmation)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isPaid"], true);
    assert!(body["paidAt"].is_string());
    assert_eq!(body["paymentResult"]["id"], "PAY-123");
    assert_eq!(body["paymentResult"]["status"], "COMPLETED");
    assert_eq!(body["paymentResult"]["update_time"], "2024-05-01T10:00:00Z");
    assert_eq!(body["paymentResult"]["email_address"], "buyer@example.com");
}

#[tokio::test]
async fn test_pay_without_payer_email_is_400() {
    let (_store, app) = app();
    let caller = Caller::user();
    let (_, created) = send(&app, Method::POST, "/api/orders", Some(&caller), Some(order_payload())).await;

    let uri = format!("/api/orders/{}/pay", created["id"].as_str().unwrap());
    let confirmation = json!({"id": "PAY-123", "status": "COMPLETED"});
    let (status, body) = send(&app, Method::PUT, &uri, Some(&caller), Some(confirmation)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Payer email address is required");
}

#[tokio::test]
async fn test_deliver_is_admin_only() {
    let (_store, app) = app();
    let caller = Caller::user();
    let (_, created) = send(&app, Method::POST, "/api/orders", Some(&caller), Some(order_payload())).await;
    let uri = format!("/api/orders/{}/deliver", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PUT, &uri, Some(&caller), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized as an admin");

    let (status, body) = send(&app, Method::PUT, &uri, Some(&Caller::admin()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isDelivered"], true);
    assert!(body["deliveredAt"].is_string());
    assert_eq!(body["totalPrice"].as_f64(), Some(28.0));
}

#[tokio::test]
async fn test_my_orders_only_lists_caller() {
    let (_store, app) = app();
    let alice = Caller::user();
    let bob = Caller::user();
    send(&app, Method::POST, "/api/orders", Some(&alice), Some(order_payload())).await;
    send(&app, Method::POST, "/api/orders", Some(&bob), Some(order_payload())).await;

    let (status, body) = send(&app, Method::GET, "/api/orders/myorders", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user"], alice.id.to_string());
}

#[tokio::test]
async fn test_list_all_orders_is_admin_only_and_resolves_owner() {
    let (store, app) = app();
    let caller = Caller::user();
    store
        .add_user(UserRef { id: caller.id, name: "Ada".into(), email: "ada@example.com".into() })
        .await;
    send(&app, Method::POST, "/api/orders", Some(&caller), Some(order_payload())).await;

    let (status, _) = send(&app, Method::GET, "/api/orders", Some(&caller), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/api/orders", Some(&Caller::admin()), None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user"]["name"], "Ada");
    assert!(orders[0]["user"].get("email").is_none());
}

#[tokio::test]
async fn test_update_shipping_status_envelope() {
    let (_store, app) = app();
    let caller = Caller::user();
    let (_, created) = send(&app, Method::POST, "/api/orders", Some(&caller), Some(order_payload())).await;

    let payload = json!({"orderId": created["id"]});
    let (status, body) =
        send(&app, Method::POST, "/api/orders/update-shipping-status", Some(&Caller::admin()), Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Shipping status updated to Delivered");
    assert_eq!(body["updatedOrder"]["isDelivered"], true);
    assert!(body["updatedOrder"]["deliveredAt"].is_string());

    let payload = json!({"orderId": Uuid::new_v4()});
    let (status, _) =
        send(&app, Method::POST, "/api/orders/update-shipping-status", Some(&Caller::admin()), Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_update_sets_flags_without_timestamps() {
    let (_store, app) = app();
    let caller = Caller::user();
    let payload = json!({
        "orderItems": [
            {"product": Uuid::new_v4(), "name": "Widget", "qty": 1, "price": 7, "image": "/images/widget.jpg"}
        ],
        "shippingAddress": {"address": "1 Main St", "city": "Lagos", "postalCode": "100001", "country": "NG"},
        "paymentMethod": "COD"
    });
    let (_, created) = send(&app, Method::POST, "/api/orders", Some(&caller), Some(payload)).await;

    let uri = format!("/api/orders/update-order/{}", created["id"].as_str().unwrap());
    let (status, body) =
        send(&app, Method::POST, &uri, Some(&Caller::admin()), Some(json!({"delivered": true, "paid": true}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order updated successfully");
    assert_eq!(body["order"]["isPaid"], true);
    assert_eq!(body["order"]["isDelivered"], true);
    assert!(body["order"]["paidAt"].is_null());
    assert!(body["order"]["deliveredAt"].is_null());
}
