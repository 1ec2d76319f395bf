mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use pizza_auth::Role;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("{0}")]
    NotFound(&'static str),
}

/// A user record. The password hash never serializes; responses carry only
/// the public projection.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// Partial user update. `roles`, when present, atomically replaces the full
/// role set.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub roles: Option<Vec<Role>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Franchise {
    pub id: Uuid,
    pub name: String,
    pub admins: Vec<FranchiseAdmin>,
    pub stores: Vec<StoreLocation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FranchiseAdmin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreLocation {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuItem {
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub franchise_id: Uuid,
    pub store_id: Uuid,
    #[serde(skip_serializing)]
    pub diner_id: Uuid,
    pub items: Vec<OrderItem>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub menu_id: Uuid,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub franchise_id: Uuid,
    pub store_id: Uuid,
    pub items: Vec<OrderItem>,
}

/// Persistence seam for the service. Implementations must apply each call
/// atomically: a failed or cancelled operation leaves no partial state.
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<User>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;
    /// Page is zero-based; the flag reports whether more pages exist.
    async fn list_users(
        &self,
        page: usize,
        limit: usize,
        name: Option<&str>,
    ) -> StoreResult<(Vec<User>, bool)>;

    /// Creates the franchise and grants each admin a franchisee role for it.
    async fn create_franchise(&self, name: String, admin_ids: Vec<Uuid>) -> StoreResult<Franchise>;
    async fn get_franchise(&self, id: Uuid) -> StoreResult<Option<Franchise>>;
    async fn list_franchises(
        &self,
        page: usize,
        limit: usize,
        name: Option<&str>,
    ) -> StoreResult<(Vec<Franchise>, bool)>;
    async fn franchises_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Franchise>>;
    /// Removes the franchise and strips the matching franchisee roles.
    async fn delete_franchise(&self, id: Uuid) -> StoreResult<()>;
    async fn create_store(&self, franchise_id: Uuid, name: String) -> StoreResult<StoreLocation>;
    async fn delete_store(&self, franchise_id: Uuid, store_id: Uuid) -> StoreResult<()>;

    async fn menu(&self) -> StoreResult<Vec<MenuItem>>;
    async fn add_menu_item(&self, item: NewMenuItem) -> StoreResult<MenuItem>;
    async fn create_order(&self, diner_id: Uuid, order: NewOrder) -> StoreResult<Order>;
    async fn orders_for_user(
        &self,
        diner_id: Uuid,
        page: usize,
        limit: usize,
    ) -> StoreResult<(Vec<Order>, bool)>;
}
