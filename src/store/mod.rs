//! Persistence collaborator for orders.
//!
//! The service talks to storage through [`OrderStore`]; the Postgres
//! implementation backs the running process and the in-memory one backs the
//! tests. `set_status_flags` is a direct flag update that bypasses the
//! timestamp pairing maintained by the pay/deliver paths.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{NewOrder, Order};
use crate::error::Result;

pub mod memory;
pub mod postgres;

pub use memory::MemoryOrderStore;
pub use postgres::PgOrderStore;

/// Display fields of an order's owning user.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order, assigning its id and timestamps.
    async fn create(&self, new: NewOrder) -> Result<Order>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>>;

    async fn find_all(&self) -> Result<Vec<Order>>;

    /// Writes back the mutable state of an order (payment and delivery).
    /// Price fields are immutable after creation and are not written.
    async fn save(&self, order: &Order) -> Result<Order>;

    /// Sets the two status booleans directly, leaving both timestamps
    /// untouched. Returns `None` when the order does not exist.
    async fn set_status_flags(&self, id: Uuid, delivered: bool, paid: bool) -> Result<Option<Order>>;

    /// Resolves the owning user's display fields.
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>>;
}
