//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use bakery_admin::error::{AppError, AppResult};
use bakery_admin::external::{ImageStore, ImageUpload};
use bakery_admin::repositories::{MemoryStore, Stores};
use bakery_admin::services::{
    CatalogService, ContentService, OrderService, ReportingService, StockService, UserService,
};
use bakery_admin::{AppState, Config};
use shared::models::{
    Order, OrderItem, OrderStatus, PaymentStatus, Size, SizeInput, StockBatchInput,
};
use shared::types::HostedImage;

/// Image store that records calls instead of talking to the network
#[derive(Default)]
pub struct RecordingImages {
    pub uploaded: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub fail_deletes: bool,
}

impl RecordingImages {
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for RecordingImages {
    async fn upload(&self, upload: ImageUpload) -> AppResult<HostedImage> {
        let public_id = format!("bakery-admin/{}", upload.file_name.trim_end_matches(".png"));
        self.uploaded.lock().unwrap().push(upload.file_name);
        Ok(HostedImage {
            url: format!("https://res.cloudinary.com/demo/image/upload/v1/{}.png", public_id),
            public_id,
        })
    }

    async fn delete(&self, url: &str) -> AppResult<()> {
        self.deleted.lock().unwrap().push(url.to_string());
        if self.fail_deletes {
            return Err(AppError::ImageHosting("destroy failed".to_string()));
        }
        Ok(())
    }
}

/// Services wired to one in-memory store
pub struct TestContext {
    pub config: Config,
    pub stores: Stores,
    pub memory: Arc<MemoryStore>,
    pub images: Arc<RecordingImages>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_images(RecordingImages::default())
    }

    pub fn with_images(images: RecordingImages) -> Self {
        let (stores, memory) = Stores::in_memory();
        Self {
            config: Config::for_tests(),
            stores,
            memory,
            images: Arc::new(images),
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            config: Arc::new(self.config.clone()),
            stores: self.stores.clone(),
            images: self.images.clone(),
        }
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(&self.stores, self.images.clone())
    }

    pub fn content(&self) -> ContentService {
        ContentService::new(&self.stores, self.images.clone())
    }

    pub fn stock(&self) -> StockService {
        StockService::new(&self.stores, &self.config.stock)
    }

    pub fn orders(&self) -> OrderService {
        OrderService::new(&self.stores, &self.config.payments)
    }

    pub fn users(&self) -> UserService {
        UserService::new(&self.stores)
    }

    pub fn reporting(&self) -> ReportingService {
        ReportingService::new(&self.stores, &self.config.stock, &self.config.payments)
    }

    pub async fn size(&self, name: &str, max_varieties: i32) -> Size {
        self.catalog()
            .create_size(SizeInput {
                name: name.to_string(),
                price: Decimal::new(45000, 2),
                max_varieties,
                allowed_varieties: Vec::new(),
            })
            .await
            .unwrap()
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// A batch produced yesterday that expires in ten days
pub fn batch_input(size_id: Uuid, varieties: &[&str], quantity: i32) -> StockBatchInput {
    StockBatchInput {
        size_id,
        varieties: varieties.iter().map(|v| v.to_string()).collect(),
        quantity,
        min_stock: 2,
        reorder_point: 5,
        production_date: today() - Duration::days(1),
        expiry_date: today() + Duration::days(10),
        remarks: String::new(),
        confirm_expired: false,
    }
}

pub fn order(number: &str, payment_method: &str, minutes_ago: i64) -> Order {
    let placed = Utc::now() - Duration::minutes(minutes_ago);
    Order {
        id: Uuid::new_v4(),
        order_number: number.to_string(),
        customer_name: "Maria Santos".to_string(),
        customer_email: Some("maria@example.ph".to_string()),
        customer_phone: None,
        items: vec![OrderItem {
            product_name: "Bibingka".to_string(),
            size_name: Some("Big Bilao".to_string()),
            varieties: vec!["Ube".to_string(), "Cassava".to_string()],
            quantity: 2,
            unit_price: Decimal::new(45000, 2),
        }],
        total_amount: Decimal::new(90000, 2),
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        payment_method: payment_method.to_string(),
        payment_reference: None,
        payment_proof_url: None,
        delivery_address: None,
        notes: None,
        order_date: placed,
        updated_at: placed,
    }
}
