//! Postgres-backed order store. Items, addresses and payment results are
//! stored as JSONB documents on the order row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{NewOrder, Order, OrderItem, PaymentResult, ShippingAddress};
use crate::error::Result;
use crate::store::{OrderStore, UserRef};

const ORDER_COLUMNS: &str = "id, user_id, order_items, shipping_address, payment_method, \
     payment_result, items_price, tax_price, shipping_price, total_price, total_amount, \
     is_paid, paid_at, is_delivered, delivered_at, created_at, updated_at";

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    order_items: Json<Vec<OrderItem>>,
    shipping_address: Json<ShippingAddress>,
    payment_method: String,
    payment_result: Option<Json<PaymentResult>>,
    items_price: Decimal,
    tax_price: Decimal,
    shipping_price: Decimal,
    total_price: Decimal,
    total_amount: Decimal,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            order_items: row.order_items.0,
            shipping_address: row.shipping_address.0,
            payment_method: row.payment_method,
            payment_result: row.payment_result.map(|r| r.0),
            items_price: row.items_price,
            tax_price: row.tax_price,
            shipping_price: row.shipping_price,
            total_price: row.total_price,
            total_amount: row.total_amount,
            is_paid: row.is_paid,
            paid_at: row.paid_at,
            is_delivered: row.is_delivered,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, new: NewOrder) -> Result<Order> {
        let sql = format!(
            "INSERT INTO orders (id, user_id, order_items, shipping_address, payment_method, \
             items_price, tax_price, shipping_price, total_price, total_amount, is_paid, paid_at, \
             is_delivered, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, FALSE, NOW(), NOW()) \
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(Uuid::now_v7())
            .bind(new.user_id)
            .bind(Json(&new.order_items))
            .bind(Json(&new.shipping_address))
            .bind(&new.payment_method)
            .bind(new.items_price)
            .bind(new.tax_price)
            .bind(new.shipping_price)
            .bind(new.total_price)
            .bind(new.total_price)
            .bind(new.is_paid)
            .bind(new.paid_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(Into::into))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn save(&self, order: &Order) -> Result<Order> {
        let sql = format!(
            "UPDATE orders SET payment_result = $2, is_paid = $3, paid_at = $4, \
             is_delivered = $5, delivered_at = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order.id)
            .bind(order.payment_result.as_ref().map(Json))
            .bind(order.is_paid)
            .bind(order.paid_at)
            .bind(order.is_delivered)
            .bind(order.delivered_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn set_status_flags(&self, id: Uuid, delivered: bool, paid: bool) -> Result<Option<Order>> {
        let sql = format!(
            "UPDATE orders SET is_delivered = $2, is_paid = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(delivered)
            .bind(paid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>> {
        let user = sqlx::query_as::<_, UserRef>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
