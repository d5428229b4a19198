//! Storage interfaces for each administrative module
//!
//! Services depend on these traits only. [`PgStore`] backs the running
//! server; [`MemoryStore`] backs tests and local tooling. Ledger operations
//! that touch a batch and its movements are single trait calls so each
//! implementation can make them atomic.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use shared::models::{
    ActivityLog, Announcement, Category, DamagedGood, Order, OrderChange, OrderQuery, OrderStatus,
    PaymentStatus, Product, Promotion, Size, StockBatch, StockMovement, Supplier, User, Variety,
};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Capacity of the order change channel
pub const ORDER_FEED_CAPACITY: usize = 64;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // Sizes
    async fn list_sizes(&self) -> AppResult<Vec<Size>>;
    async fn get_size(&self, id: Uuid) -> AppResult<Option<Size>>;
    /// Case-insensitive name lookup, ignoring `exclude`
    async fn size_name_taken(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool>;
    async fn insert_size(&self, size: &Size) -> AppResult<()>;
    async fn update_size(&self, size: &Size) -> AppResult<bool>;
    async fn delete_size(&self, id: Uuid) -> AppResult<bool>;

    // Varieties
    async fn list_varieties(&self) -> AppResult<Vec<Variety>>;
    async fn variety_name_taken(&self, name: &str) -> AppResult<bool>;
    async fn insert_variety(&self, variety: &Variety) -> AppResult<()>;
    async fn delete_variety(&self, id: Uuid) -> AppResult<bool>;

    // Categories
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>>;
    async fn insert_category(&self, category: &Category) -> AppResult<()>;
    async fn update_category(&self, category: &Category) -> AppResult<bool>;
    async fn delete_category(&self, id: Uuid) -> AppResult<bool>;
    async fn count_products_in_category(&self, category_id: Uuid) -> AppResult<i64>;

    // Products
    async fn list_products(&self, category_id: Option<Uuid>) -> AppResult<Vec<Product>>;
    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>>;
    async fn insert_product(&self, product: &Product) -> AppResult<()>;
    async fn update_product(&self, product: &Product) -> AppResult<bool>;
    async fn delete_product(&self, id: Uuid) -> AppResult<bool>;

    // Suppliers
    async fn list_suppliers(&self) -> AppResult<Vec<Supplier>>;
    async fn get_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>>;
    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()>;
    async fn update_supplier(&self, supplier: &Supplier) -> AppResult<bool>;
    async fn delete_supplier(&self, id: Uuid) -> AppResult<bool>;

    // Damaged goods
    async fn list_damaged_goods(&self) -> AppResult<Vec<DamagedGood>>;
    async fn get_damaged_good(&self, id: Uuid) -> AppResult<Option<DamagedGood>>;
    async fn insert_damaged_good(&self, item: &DamagedGood) -> AppResult<()>;
    async fn update_damaged_good(&self, item: &DamagedGood) -> AppResult<bool>;
    async fn delete_damaged_good(&self, id: Uuid) -> AppResult<bool>;
}

/// Stock batches and their append-only ledger
#[async_trait]
pub trait StockRepository: Send + Sync {
    async fn list_batches(&self) -> AppResult<Vec<StockBatch>>;
    async fn get_batch(&self, id: Uuid) -> AppResult<Option<StockBatch>>;

    /// Store a new batch together with its opening movement
    async fn insert_batch(&self, batch: &StockBatch, opening: &StockMovement) -> AppResult<()>;

    /// Replace a batch's fields. When the quantity differs from the stored
    /// one an `adjustment` movement is appended. `None` when the batch is gone.
    async fn replace_batch(
        &self,
        batch: &StockBatch,
        actor_id: Option<Uuid>,
        remarks: &str,
    ) -> AppResult<Option<(StockBatch, Option<StockMovement>)>>;

    /// Apply a signed delta under the non-negative rule and append the
    /// matching movement
    async fn adjust_batch(
        &self,
        id: Uuid,
        delta: i32,
        actor_id: Option<Uuid>,
        remarks: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Option<(StockBatch, StockMovement)>>;

    /// Remove a batch, flag its movements deleted, and append the `deleted`
    /// movement
    async fn remove_batch(
        &self,
        id: Uuid,
        actor_id: Option<Uuid>,
        remarks: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Option<StockMovement>>;

    /// Newest-first
    async fn list_movements(
        &self,
        stock_id: Option<Uuid>,
        include_deleted: bool,
        limit: u32,
    ) -> AppResult<Vec<StockMovement>>;

    /// All movements with `timestamp >= since`, oldest first
    async fn movements_since(&self, since: DateTime<Utc>) -> AppResult<Vec<StockMovement>>;
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn list_promotions(&self) -> AppResult<Vec<Promotion>>;
    async fn get_promotion(&self, id: Uuid) -> AppResult<Option<Promotion>>;
    async fn insert_promotion(&self, promotion: &Promotion) -> AppResult<()>;
    async fn update_promotion(&self, promotion: &Promotion) -> AppResult<bool>;
    async fn delete_promotion(&self, id: Uuid) -> AppResult<bool>;

    async fn list_announcements(&self) -> AppResult<Vec<Announcement>>;
    async fn get_announcement(&self, id: Uuid) -> AppResult<Option<Announcement>>;
    async fn insert_announcement(&self, announcement: &Announcement) -> AppResult<()>;
    async fn update_announcement(&self, announcement: &Announcement) -> AppResult<bool>;
    async fn delete_announcement(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Newest-first by order date
    async fn list_orders(&self, query: &OrderQuery) -> AppResult<Vec<Order>>;
    async fn get_order(&self, id: Uuid) -> AppResult<Option<Order>>;
    async fn set_status(&self, id: Uuid, status: OrderStatus, at: DateTime<Utc>) -> AppResult<Option<Order>>;
    async fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Order>>;

    /// Change notifications for the live order feed
    fn subscribe(&self) -> broadcast::Receiver<OrderChange>;
}

/// Stored credential row for sign-in
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_users(&self) -> AppResult<Vec<User>>;
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_credentials(&self, email: &str) -> AppResult<Option<UserCredentials>>;
    async fn email_taken(&self, email: &str) -> AppResult<bool>;
    async fn insert_user(&self, user: &User, password_hash: &str) -> AppResult<()>;
    async fn update_user(&self, user: &User) -> AppResult<bool>;

    async fn store_refresh_token(&self, record: &RefreshTokenRecord) -> AppResult<()>;
    /// Remove and return the token so it can be used at most once
    async fn take_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>>;

    async fn insert_activity(&self, entry: &ActivityLog) -> AppResult<()>;
    /// Newest-first
    async fn list_activity(&self, limit: u32) -> AppResult<Vec<ActivityLog>>;
}

/// Backend liveness check for the health endpoint
#[async_trait]
pub trait Probe: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

/// Every repository the services need, behind trait objects
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogRepository>,
    pub stock: Arc<dyn StockRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub users: Arc<dyn UserRepository>,
    pub probe: Arc<dyn Probe>,
}

impl Stores {
    /// Use one backend for every module
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: CatalogRepository
            + StockRepository
            + ContentRepository
            + OrderRepository
            + UserRepository
            + Probe
            + 'static,
    {
        Self {
            catalog: backend.clone(),
            stock: backend.clone(),
            content: backend.clone(),
            orders: backend.clone(),
            users: backend.clone(),
            probe: backend,
        }
    }

    pub fn in_memory() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Self::from_backend(store.clone()), store)
    }
}
