//! In-memory order store, used by the test suite.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{NewOrder, Order};
use crate::error::Result;
use crate::store::{OrderStore, UserRef};

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<Order>>,
    users: RwLock<HashMap<Uuid, UserRef>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: UserRef) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, new: NewOrder) -> Result<Order> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::now_v7(),
            user_id: new.user_id,
            order_items: new.order_items,
            shipping_address: new.shipping_address,
            payment_method: new.payment_method,
            payment_result: None,
            items_price: new.items_price,
            tax_price: new.tax_price,
            shipping_price: new.shipping_price,
            total_price: new.total_price,
            total_amount: new.total_price,
            is_paid: new.is_paid,
            paid_at: new.paid_at,
            is_delivered: false,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        };
        self.orders.write().await.push(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.orders.read().await.iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        Ok(self.orders.read().await.iter().filter(|o| o.user_id == user_id).cloned().collect())
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        Ok(self.orders.read().await.clone())
    }

    async fn save(&self, order: &Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or(crate::error::ApiError::OrderNotFound)?;
        let mut updated = order.clone();
        updated.updated_at = Utc::now();
        *stored = updated.clone();
        Ok(updated)
    }

    async fn set_status_flags(&self, id: Uuid, delivered: bool, paid: bool) -> Result<Option<Order>> {
        let mut orders = self.orders.write().await;
        let Some(stored) = orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        stored.is_delivered = delivered;
        stored.is_paid = paid;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}
