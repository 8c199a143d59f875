//! Order service: creation pricing, state transitions and listings.

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{NewOrder, Order, OrderItem, PaymentConfirmation, PaymentResult, ShippingAddress};
use crate::error::{ApiError, Result};
use crate::store::{OrderStore, UserRef};

pub struct OrderService {
    store: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Prices and persists a new order. COD orders start unpaid; every
    /// other payment method is treated as settled upfront.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        order_items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: String,
        tax_input: Option<serde_json::Value>,
        shipping_input: Option<serde_json::Value>,
    ) -> Result<Order> {
        let new = NewOrder::place(user_id, order_items, shipping_address, payment_method, tax_input, shipping_input)?;
        self.store.create(new).await
    }

    /// Fetches one order together with its owner's display fields. Any
    /// authenticated caller may fetch any order by id.
    pub async fn get_order(&self, id: Uuid) -> Result<(Order, Option<UserRef>)> {
        let order = self.store.find_by_id(id).await?.ok_or(ApiError::OrderNotFound)?;
        let user = self.store.find_user(order.user_id).await?;
        Ok((order, user))
    }

    pub async fn pay_order(&self, id: Uuid, confirmation: PaymentConfirmation) -> Result<Order> {
        let mut order = self.store.find_by_id(id).await?.ok_or(ApiError::OrderNotFound)?;
        let result = PaymentResult::from_confirmation(confirmation)?;
        order.record_payment(result);
        self.store.save(&order).await
    }

    pub async fn deliver_order(&self, id: Uuid) -> Result<Order> {
        let mut order = self.store.find_by_id(id).await?.ok_or(ApiError::OrderNotFound)?;
        order.mark_delivered();
        self.store.save(&order).await
    }

    /// Bulk flag update used by the admin dashboard. Writes the two
    /// booleans as given; the paired timestamps are left untouched and no
    /// price field is recomputed.
    pub async fn set_order_status(&self, id: Uuid, delivered: bool, paid: bool) -> Result<Order> {
        self.store
            .set_status_flags(id, delivered, paid)
            .await?
            .ok_or(ApiError::OrderNotFound)
    }

    pub async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        self.store.find_by_user(user_id).await
    }

    /// All orders with each owner resolved, for the admin listing.
    pub async fn all_orders(&self) -> Result<Vec<(Order, Option<UserRef>)>> {
        let orders = self.store.find_all().await?;
        let mut users: HashMap<Uuid, Option<UserRef>> = HashMap::new();
        let mut resolved = Vec::with_capacity(orders.len());
        for order in orders {
            let user = match users.get(&order.user_id) {
                Some(u) => u.clone(),
                None => {
                    let u = self.store.find_user(order.user_id).await?;
                    users.insert(order.user_id, u.clone());
                    u
                }
            };
            resolved.push((order, user));
        }
        Ok(resolved)
    }
}
