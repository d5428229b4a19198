//! In-memory backend
//!
//! Holds every module's records behind one lock so ledger operations are
//! atomic the same way a database transaction makes them atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use shared::models::{
    ActivityLog, Announcement, Category, DamagedGood, MovementType, Order, OrderChange, OrderQuery,
    OrderStatus, PaymentStatus, Product, Promotion, Size, StockBatch, StockMovement, Supplier, User,
    Variety,
};
use shared::validation::apply_delta;

use super::{
    CatalogRepository, ContentRepository, OrderRepository, Probe, RefreshTokenRecord,
    StockRepository, UserCredentials, UserRepository, ORDER_FEED_CAPACITY,
};
use crate::error::AppResult;

#[derive(Default)]
struct State {
    sizes: HashMap<Uuid, Size>,
    varieties: HashMap<Uuid, Variety>,
    categories: HashMap<Uuid, Category>,
    products: HashMap<Uuid, Product>,
    suppliers: HashMap<Uuid, Supplier>,
    damaged_goods: HashMap<Uuid, DamagedGood>,
    batches: HashMap<Uuid, StockBatch>,
    /// Append order is chronological
    movements: Vec<StockMovement>,
    promotions: HashMap<Uuid, Promotion>,
    announcements: HashMap<Uuid, Announcement>,
    orders: HashMap<Uuid, Order>,
    users: HashMap<Uuid, UserCredentials>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    activity: Vec<ActivityLog>,
}

pub struct MemoryStore {
    state: RwLock<State>,
    order_changes: broadcast::Sender<OrderChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (order_changes, _) = broadcast::channel(ORDER_FEED_CAPACITY);
        Self {
            state: RwLock::new(State::default()),
            order_changes,
        }
    }

    /// Orders arrive from the storefront; this stands in for that writer
    pub async fn insert_order(&self, order: Order) {
        let order_id = order.id;
        self.state.write().await.orders.insert(order_id, order);
        self.publish(order_id, "INSERT");
    }

    pub async fn delete_order(&self, id: Uuid) -> bool {
        let removed = self.state.write().await.orders.remove(&id).is_some();
        if removed {
            self.publish(id, "DELETE");
        }
        removed
    }

    fn publish(&self, order_id: Uuid, operation: &str) {
        // No subscribers is fine
        let _ = self.order_changes.send(OrderChange {
            order_id,
            operation: operation.to_string(),
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_by_name<T: Clone>(items: &HashMap<Uuid, T>, name: impl Fn(&T) -> &str) -> Vec<T> {
    let mut out: Vec<T> = items.values().cloned().collect();
    out.sort_by_key(|item| name(item).to_lowercase());
    out
}

fn replace<T: Clone>(items: &mut HashMap<Uuid, T>, id: Uuid, value: &T) -> bool {
    match items.get_mut(&id) {
        Some(slot) => {
            *slot = value.clone();
            true
        }
        None => false,
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn list_sizes(&self) -> AppResult<Vec<Size>> {
        Ok(sorted_by_name(&self.state.read().await.sizes, |s| &s.name))
    }

    async fn get_size(&self, id: Uuid) -> AppResult<Option<Size>> {
        Ok(self.state.read().await.sizes.get(&id).cloned())
    }

    async fn size_name_taken(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .sizes
            .values()
            .any(|s| Some(s.id) != exclude && s.name.eq_ignore_ascii_case(name.trim())))
    }

    async fn insert_size(&self, size: &Size) -> AppResult<()> {
        self.state.write().await.sizes.insert(size.id, size.clone());
        Ok(())
    }

    async fn update_size(&self, size: &Size) -> AppResult<bool> {
        Ok(replace(&mut self.state.write().await.sizes, size.id, size))
    }

    async fn delete_size(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.sizes.remove(&id).is_some())
    }

    async fn list_varieties(&self) -> AppResult<Vec<Variety>> {
        Ok(sorted_by_name(&self.state.read().await.varieties, |v| &v.name))
    }

    async fn variety_name_taken(&self, name: &str) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .varieties
            .values()
            .any(|v| v.name.eq_ignore_ascii_case(name.trim())))
    }

    async fn insert_variety(&self, variety: &Variety) -> AppResult<()> {
        self.state.write().await.varieties.insert(variety.id, variety.clone());
        Ok(())
    }

    async fn delete_variety(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.varieties.remove(&id).is_some())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(sorted_by_name(&self.state.read().await.categories, |c| &c.name))
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn insert_category(&self, category: &Category) -> AppResult<()> {
        self.state.write().await.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> AppResult<bool> {
        Ok(replace(&mut self.state.write().await.categories, category.id, category))
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.categories.remove(&id).is_some())
    }

    async fn count_products_in_category(&self, category_id: Uuid) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .filter(|p| p.category_id == category_id)
            .count() as i64)
    }

    async fn list_products(&self, category_id: Option<Uuid>) -> AppResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut products = sorted_by_name(&state.products, |p| &p.name);
        if let Some(category_id) = category_id {
            products.retain(|p| p.category_id == category_id);
        }
        Ok(products)
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn insert_product(&self, product: &Product) -> AppResult<()> {
        self.state.write().await.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> AppResult<bool> {
        Ok(replace(&mut self.state.write().await.products, product.id, product))
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.products.remove(&id).is_some())
    }

    async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        Ok(sorted_by_name(&self.state.read().await.suppliers, |s| &s.name))
    }

    async fn get_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>> {
        Ok(self.state.read().await.suppliers.get(&id).cloned())
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()> {
        self.state.write().await.suppliers.insert(supplier.id, supplier.clone());
        Ok(())
    }

    async fn update_supplier(&self, supplier: &Supplier) -> AppResult<bool> {
        Ok(replace(&mut self.state.write().await.suppliers, supplier.id, supplier))
    }

    async fn delete_supplier(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.suppliers.remove(&id).is_some())
    }

    async fn list_damaged_goods(&self) -> AppResult<Vec<DamagedGood>> {
        let state = self.state.read().await;
        let mut items: Vec<DamagedGood> = state.damaged_goods.values().cloned().collect();
        items.sort_by(|a, b| {
            b.reported_date
                .cmp(&a.reported_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(items)
    }

    async fn get_damaged_good(&self, id: Uuid) -> AppResult<Option<DamagedGood>> {
        Ok(self.state.read().await.damaged_goods.get(&id).cloned())
    }

    async fn insert_damaged_good(&self, item: &DamagedGood) -> AppResult<()> {
        self.state.write().await.damaged_goods.insert(item.id, item.clone());
        Ok(())
    }

    async fn update_damaged_good(&self, item: &DamagedGood) -> AppResult<bool> {
        Ok(replace(&mut self.state.write().await.damaged_goods, item.id, item))
    }

    async fn delete_damaged_good(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.damaged_goods.remove(&id).is_some())
    }
}

#[async_trait]
impl StockRepository for MemoryStore {
    async fn list_batches(&self) -> AppResult<Vec<StockBatch>> {
        let state = self.state.read().await;
        let mut batches: Vec<StockBatch> = state.batches.values().cloned().collect();
        batches.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(batches)
    }

    async fn get_batch(&self, id: Uuid) -> AppResult<Option<StockBatch>> {
        Ok(self.state.read().await.batches.get(&id).cloned())
    }

    async fn insert_batch(&self, batch: &StockBatch, opening: &StockMovement) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.batches.insert(batch.id, batch.clone());
        state.movements.push(opening.clone());
        Ok(())
    }

    async fn replace_batch(
        &self,
        batch: &StockBatch,
        actor_id: Option<Uuid>,
        remarks: &str,
    ) -> AppResult<Option<(StockBatch, Option<StockMovement>)>> {
        let mut state = self.state.write().await;
        let Some(slot) = state.batches.get_mut(&batch.id) else {
            return Ok(None);
        };
        let previous = slot.quantity;
        *slot = batch.clone();

        let movement = (previous != batch.quantity).then(|| {
            StockMovement::record(
                batch,
                MovementType::Adjustment,
                previous,
                batch.quantity,
                actor_id,
                remarks,
                batch.last_updated,
            )
        });
        if let Some(movement) = &movement {
            state.movements.push(movement.clone());
        }
        Ok(Some((batch.clone(), movement)))
    }

    async fn adjust_batch(
        &self,
        id: Uuid,
        delta: i32,
        actor_id: Option<Uuid>,
        remarks: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Option<(StockBatch, StockMovement)>> {
        let mut state = self.state.write().await;
        let Some(batch) = state.batches.get_mut(&id) else {
            return Ok(None);
        };
        let previous = batch.quantity;
        let current = apply_delta(previous, delta)?;
        batch.quantity = current;
        batch.last_updated = at;
        let updated = batch.clone();

        let movement = StockMovement::record(
            &updated,
            MovementType::for_delta(delta),
            previous,
            current,
            actor_id,
            remarks,
            at,
        );
        state.movements.push(movement.clone());
        Ok(Some((updated, movement)))
    }

    async fn remove_batch(
        &self,
        id: Uuid,
        actor_id: Option<Uuid>,
        remarks: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Option<StockMovement>> {
        let mut state = self.state.write().await;
        let Some(batch) = state.batches.remove(&id) else {
            return Ok(None);
        };

        for movement in state.movements.iter_mut().filter(|m| m.stock_id == id) {
            movement.is_deleted = true;
        }

        let mut deleted = StockMovement::record(
            &batch,
            MovementType::Deleted,
            batch.quantity,
            0,
            actor_id,
            remarks,
            at,
        );
        deleted.is_deleted = true;
        state.movements.push(deleted.clone());
        Ok(Some(deleted))
    }

    async fn list_movements(
        &self,
        stock_id: Option<Uuid>,
        include_deleted: bool,
        limit: u32,
    ) -> AppResult<Vec<StockMovement>> {
        let state = self.state.read().await;
        let mut movements: Vec<StockMovement> = state
            .movements
            .iter()
            .rev()
            .filter(|m| stock_id.map_or(true, |id| m.stock_id == id))
            .filter(|m| include_deleted || !m.is_deleted)
            .cloned()
            .collect();
        // Stable sort keeps the newest append first among equal timestamps
        movements.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        movements.truncate(limit as usize);
        Ok(movements)
    }

    async fn movements_since(&self, since: DateTime<Utc>) -> AppResult<Vec<StockMovement>> {
        let state = self.state.read().await;
        let mut movements: Vec<StockMovement> = state
            .movements
            .iter()
            .filter(|m| m.timestamp >= since)
            .cloned()
            .collect();
        movements.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(movements)
    }
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn list_promotions(&self) -> AppResult<Vec<Promotion>> {
        let state = self.state.read().await;
        let mut items: Vec<Promotion> = state.promotions.values().cloned().collect();
        items.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.created_at.cmp(&a.created_at)));
        Ok(items)
    }

    async fn get_promotion(&self, id: Uuid) -> AppResult<Option<Promotion>> {
        Ok(self.state.read().await.promotions.get(&id).cloned())
    }

    async fn insert_promotion(&self, promotion: &Promotion) -> AppResult<()> {
        self.state.write().await.promotions.insert(promotion.id, promotion.clone());
        Ok(())
    }

    async fn update_promotion(&self, promotion: &Promotion) -> AppResult<bool> {
        Ok(replace(&mut self.state.write().await.promotions, promotion.id, promotion))
    }

    async fn delete_promotion(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.promotions.remove(&id).is_some())
    }

    async fn list_announcements(&self) -> AppResult<Vec<Announcement>> {
        let state = self.state.read().await;
        let mut items: Vec<Announcement> = state.announcements.values().cloned().collect();
        items.sort_by(|a, b| {
            b.publish_date
                .cmp(&a.publish_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(items)
    }

    async fn get_announcement(&self, id: Uuid) -> AppResult<Option<Announcement>> {
        Ok(self.state.read().await.announcements.get(&id).cloned())
    }

    async fn insert_announcement(&self, announcement: &Announcement) -> AppResult<()> {
        self.state
            .write()
            .await
            .announcements
            .insert(announcement.id, announcement.clone());
        Ok(())
    }

    async fn update_announcement(&self, announcement: &Announcement) -> AppResult<bool> {
        Ok(replace(
            &mut self.state.write().await.announcements,
            announcement.id,
            announcement,
        ))
    }

    async fn delete_announcement(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.announcements.remove(&id).is_some())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn list_orders(&self, query: &OrderQuery) -> AppResult<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| query.matches(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(orders)
    }

    async fn get_order(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus, at: DateTime<Utc>) -> AppResult<Option<Order>> {
        let updated = {
            let mut state = self.state.write().await;
            state.orders.get_mut(&id).map(|order| {
                order.status = status;
                order.updated_at = at;
                order.clone()
            })
        };
        if updated.is_some() {
            self.publish(id, "UPDATE");
        }
        Ok(updated)
    }

    async fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Order>> {
        let updated = {
            let mut state = self.state.write().await;
            state.orders.get_mut(&id).map(|order| {
                order.payment_status = status;
                order.updated_at = at;
                order.clone()
            })
        };
        if updated.is_some() {
            self.publish(id, "UPDATE");
        }
        Ok(updated)
    }

    fn subscribe(&self) -> broadcast::Receiver<OrderChange> {
        self.order_changes.subscribe()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().map(|c| c.user.clone()).collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).map(|c| c.user.clone()))
    }

    async fn find_credentials(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|c| c.user.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn email_taken(&self, email: &str) -> AppResult<bool> {
        Ok(self.find_credentials(email).await?.is_some())
    }

    async fn insert_user(&self, user: &User, password_hash: &str) -> AppResult<()> {
        self.state.write().await.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(())
    }

    async fn update_user(&self, user: &User) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&user.id) {
            Some(credentials) => {
                credentials.user = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn store_refresh_token(&self, record: &RefreshTokenRecord) -> AppResult<()> {
        self.state
            .write()
            .await
            .refresh_tokens
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn take_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        Ok(self.state.write().await.refresh_tokens.remove(token_hash))
    }

    async fn insert_activity(&self, entry: &ActivityLog) -> AppResult<()> {
        self.state.write().await.activity.push(entry.clone());
        Ok(())
    }

    async fn list_activity(&self, limit: u32) -> AppResult<Vec<ActivityLog>> {
        let state = self.state.read().await;
        Ok(state
            .activity
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Probe for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
