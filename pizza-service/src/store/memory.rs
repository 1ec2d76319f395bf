use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use pizza_auth::Role;

use super::{
    Datastore, Franchise, FranchiseAdmin, MenuItem, NewMenuItem, NewOrder, NewUser, Order,
    StoreError, StoreLocation, StoreResult, User, UserPatch,
};

/// In-memory datastore. Every mutation runs under a single write lock, so
/// each call is atomic and a reader immediately observes prior writes.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    franchises: HashMap<Uuid, FranchiseRecord>,
    menu: Vec<MenuItem>,
    orders: HashMap<Uuid, Vec<Order>>,
}

struct FranchiseRecord {
    id: Uuid,
    name: String,
    admin_ids: Vec<Uuid>,
    stores: Vec<StoreLocation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn franchise_view(&self, record: &FranchiseRecord) -> Franchise {
        let admins = record
            .admin_ids
            .iter()
            .filter_map(|id| self.users.get(id))
            .map(|user| FranchiseAdmin {
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
            })
            .collect();
        Franchise {
            id: record.id,
            name: record.name.clone(),
            admins,
            stores: record.stores.clone(),
        }
    }
}

/// SQL-`LIKE` style matching with `*` as the multi-character wildcard, case
/// insensitive. A pattern without wildcards must match the whole name.
fn name_matches(pattern: &str, value: &str) -> bool {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let value: Vec<char> = value.to_lowercase().chars().collect();

    let mut matches = vec![vec![false; value.len() + 1]; pattern.len() + 1];
    matches[0][0] = true;
    for i in 1..=pattern.len() {
        if pattern[i - 1] == '*' {
            matches[i][0] = matches[i - 1][0];
        }
    }
    for i in 1..=pattern.len() {
        for j in 1..=value.len() {
            matches[i][j] = if pattern[i - 1] == '*' {
                matches[i - 1][j] || matches[i][j - 1]
            } else {
                matches[i - 1][j - 1] && pattern[i - 1] == value[j - 1]
            };
        }
    }
    matches[pattern.len()][value.len()]
}

fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> (Vec<T>, bool) {
    let limit = limit.max(1);
    let start = page.saturating_mul(limit);
    if start >= items.len() {
        return (Vec::new(), false);
    }
    let more = items.len() > start + limit;
    let page_items = items
        .into_iter()
        .skip(start)
        .take(limit)
        .collect();
    (page_items, more)
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().expect("rwlock poisoned");
        Ok(inner.users.values().find(|user| user.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let inner = self.inner.read().expect("rwlock poisoned");
        Ok(inner.users.get(&id).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        if inner.users.values().any(|user| user.email == new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            roles: new_user.roles,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<User> {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        if let Some(email) = &patch.email {
            if inner
                .users
                .values()
                .any(|user| user.id != id && &user.email == email)
            {
                return Err(StoreError::DuplicateEmail);
            }
        }
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound("user"))?;
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(roles) = patch.roles {
            user.roles = roles;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        inner
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("user"))
    }

    async fn list_users(
        &self,
        page: usize,
        limit: usize,
        name: Option<&str>,
    ) -> StoreResult<(Vec<User>, bool)> {
        let inner = self.inner.read().expect("rwlock poisoned");
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|user| name.is_none_or(|pattern| name_matches(pattern, &user.name)))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.email.cmp(&b.email)));
        Ok(paginate(users, page, limit))
    }

    async fn create_franchise(&self, name: String, admin_ids: Vec<Uuid>) -> StoreResult<Franchise> {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        if !admin_ids.iter().all(|id| inner.users.contains_key(id)) {
            return Err(StoreError::NotFound("user"));
        }
        let record = FranchiseRecord {
            id: Uuid::new_v4(),
            name,
            admin_ids: admin_ids.clone(),
            stores: Vec::new(),
        };
        for admin_id in &admin_ids {
            let role = Role::Franchisee {
                object_id: record.id,
            };
            if let Some(user) = inner.users.get_mut(admin_id) {
                if !user.roles.contains(&role) {
                    user.roles.push(role);
                }
            }
        }
        let view = inner.franchise_view(&record);
        inner.franchises.insert(record.id, record);
        Ok(view)
    }

    async fn get_franchise(&self, id: Uuid) -> StoreResult<Option<Franchise>> {
        let inner = self.inner.read().expect("rwlock poisoned");
        Ok(inner
            .franchises
            .get(&id)
            .map(|record| inner.franchise_view(record)))
    }

    async fn list_franchises(
        &self,
        page: usize,
        limit: usize,
        name: Option<&str>,
    ) -> StoreResult<(Vec<Franchise>, bool)> {
        let inner = self.inner.read().expect("rwlock poisoned");
        let mut franchises: Vec<Franchise> = inner
            .franchises
            .values()
            .filter(|record| name.is_none_or(|pattern| name_matches(pattern, &record.name)))
            .map(|record| inner.franchise_view(record))
            .collect();
        franchises.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(franchises, page, limit))
    }

    async fn franchises_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Franchise>> {
        let inner = self.inner.read().expect("rwlock poisoned");
        let mut franchises: Vec<Franchise> = inner
            .franchises
            .values()
            .filter(|record| record.admin_ids.contains(&user_id))
            .map(|record| inner.franchise_view(record))
            .collect();
        franchises.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(franchises)
    }

    async fn delete_franchise(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        inner
            .franchises
            .remove(&id)
            .ok_or(StoreError::NotFound("franchise"))?;
        for user in inner.users.values_mut() {
            user.roles
                .retain(|role| role.franchise_scope() != Some(id));
        }
        Ok(())
    }

    async fn create_store(&self, franchise_id: Uuid, name: String) -> StoreResult<StoreLocation> {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        let record = inner
            .franchises
            .get_mut(&franchise_id)
            .ok_or(StoreError::NotFound("franchise"))?;
        let store = StoreLocation {
            id: Uuid::new_v4(),
            name,
        };
        record.stores.push(store.clone());
        Ok(store)
    }

    async fn delete_store(&self, franchise_id: Uuid, store_id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        let record = inner
            .franchises
            .get_mut(&franchise_id)
            .ok_or(StoreError::NotFound("franchise"))?;
        let before = record.stores.len();
        record.stores.retain(|store| store.id != store_id);
        if record.stores.len() == before {
            return Err(StoreError::NotFound("store"));
        }
        Ok(())
    }

    async fn menu(&self) -> StoreResult<Vec<MenuItem>> {
        let inner = self.inner.read().expect("rwlock poisoned");
        Ok(inner.menu.clone())
    }

    async fn add_menu_item(&self, item: NewMenuItem) -> StoreResult<MenuItem> {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        let item = MenuItem {
            id: Uuid::new_v4(),
            title: item.title,
            description: item.description,
            image: item.image,
            price: item.price,
        };
        inner.menu.push(item.clone());
        Ok(item)
    }

    async fn create_order(&self, diner_id: Uuid, order: NewOrder) -> StoreResult<Order> {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        let franchise = inner
            .franchises
            .get(&order.franchise_id)
            .ok_or(StoreError::NotFound("franchise"))?;
        if !franchise.stores.iter().any(|store| store.id == order.store_id) {
            return Err(StoreError::NotFound("store"));
        }
        if !order.items.iter().all(|item| {
            inner.menu.iter().any(|menu_item| menu_item.id == item.menu_id)
        }) {
            return Err(StoreError::NotFound("menu item"));
        }
        let order = Order {
            id: Uuid::new_v4(),
            franchise_id: order.franchise_id,
            store_id: order.store_id,
            diner_id,
            items: order.items,
            date: Utc::now(),
        };
        inner.orders.entry(diner_id).or_default().push(order.clone());
        Ok(order)
    }

    async fn orders_for_user(
        &self,
        diner_id: Uuid,
        page: usize,
        limit: usize,
    ) -> StoreResult<(Vec<Order>, bool)> {
        let inner = self.inner.read().expect("rwlock poisoned");
        let orders = inner.orders.get(&diner_id).cloned().unwrap_or_default();
        Ok(paginate(orders, page, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OrderItem;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "$argon2$fake".to_string(),
            roles: vec![Role::Diner],
        }
    }

    #[test]
    fn name_matching_is_case_insensitive_like() {
        assert!(name_matches("pizza", "Pizza"));
        assert!(!name_matches("pizza", "pizza diner"));
        assert!(name_matches("*", "anything at all"));
        assert!(name_matches("pizza*", "pizza diner"));
        assert!(name_matches("*diner", "pizza diner"));
        assert!(name_matches("*zza*di*", "pizza diner"));
        assert!(!name_matches("*burger*", "pizza diner"));
        assert!(name_matches("", ""));
        assert!(!name_matches("", "x"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_on_create_and_update() {
        let db = MemoryStore::new();
        db.create_user(new_user("a", "a@test.com")).await.expect("create a");
        let b = db.create_user(new_user("b", "b@test.com")).await.expect("create b");

        let err = db.create_user(new_user("c", "a@test.com")).await;
        assert!(matches!(err, Err(StoreError::DuplicateEmail)));

        let patch = UserPatch {
            email: Some("a@test.com".to_string()),
            ..UserPatch::default()
        };
        let err = db.update_user(b.id, patch).await;
        assert!(matches!(err, Err(StoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn pagination_reports_remaining_pages() {
        let db = MemoryStore::new();
        for i in 0..5 {
            db.create_user(new_user(&format!("user{i}"), &format!("u{i}@test.com")))
                .await
                .expect("create");
        }

        let (first, more) = db.list_users(0, 2, None).await.expect("page 0");
        assert_eq!(first.len(), 2);
        assert!(more);

        let (last, more) = db.list_users(2, 2, None).await.expect("page 2");
        assert_eq!(last.len(), 1);
        assert!(!more);

        let (past_end, more) = db.list_users(9, 2, None).await.expect("page 9");
        assert!(past_end.is_empty());
        assert!(!more);
    }

    #[tokio::test]
    async fn creating_a_franchise_grants_and_deleting_revokes_franchisee_roles() {
        let db = MemoryStore::new();
        let admin = db.create_user(new_user("owner", "owner@test.com")).await.expect("create");

        let franchise = db
            .create_franchise("PizzaCorp".to_string(), vec![admin.id])
            .await
            .expect("create franchise");
        let owner = db.get_user(admin.id).await.expect("get").expect("exists");
        assert!(owner.roles.contains(&Role::Franchisee {
            object_id: franchise.id
        }));

        let owned = db.franchises_for_user(admin.id).await.expect("list");
        assert_eq!(owned.len(), 1);

        db.delete_franchise(franchise.id).await.expect("delete");
        let owner = db.get_user(admin.id).await.expect("get").expect("exists");
        assert_eq!(owner.roles, vec![Role::Diner]);
    }

    #[tokio::test]
    async fn franchise_with_unknown_admin_is_rejected() {
        let db = MemoryStore::new();
        let err = db
            .create_franchise("Ghost".to_string(), vec![Uuid::new_v4()])
            .await;
        assert!(matches!(err, Err(StoreError::NotFound("user"))));
    }

    #[tokio::test]
    async fn orders_validate_franchise_store_and_menu() {
        let db = MemoryStore::new();
        let diner = db.create_user(new_user("diner", "d@test.com")).await.expect("create");
        let franchise = db
            .create_franchise("PizzaCorp".to_string(), Vec::new())
            .await
            .expect("franchise");
        let store = db
            .create_store(franchise.id, "Downtown".to_string())
            .await
            .expect("store");
        let item = db
            .add_menu_item(NewMenuItem {
                title: "Veggie".to_string(),
                description: "A garden of delight".to_string(),
                image: "pizza1.png".to_string(),
                price: 0.05,
            })
            .await
            .expect("menu item");

        let err = db
            .create_order(
                diner.id,
                NewOrder {
                    franchise_id: franchise.id,
                    store_id: store.id,
                    items: vec![OrderItem {
                        menu_id: Uuid::new_v4(),
                        description: "bogus".to_string(),
                        price: 1.0,
                    }],
                },
            )
            .await;
        assert!(matches!(err, Err(StoreError::NotFound("menu item"))));

        let order = db
            .create_order(
                diner.id,
                NewOrder {
                    franchise_id: franchise.id,
                    store_id: store.id,
                    items: vec![OrderItem {
                        menu_id: item.id,
                        description: item.title.clone(),
                        price: item.price,
                    }],
                },
            )
            .await
            .expect("order");
        assert_eq!(order.diner_id, diner.id);

        let (orders, more) = db.orders_for_user(diner.id, 0, 10).await.expect("orders");
        assert_eq!(orders.len(), 1);
        assert!(!more);
    }
}
