//! Catalog service: sizes, varieties, categories, products, suppliers and
//! damaged-goods reports

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use shared::models::{
    Category, CategoryInput, DamagedGood, DamagedGoodInput, Product, ProductInput, Size, SizeInput,
    Supplier, SupplierInput, Variety, VarietyInput,
};
use shared::validation::validate_price;

use super::MediaService;
use crate::error::{AppError, AppResult};
use crate::external::ImageStore;
use crate::repositories::{CatalogRepository, Stores};

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    media: MediaService,
}

fn not_found(resource: &str) -> AppError {
    AppError::NotFound(resource.to_string())
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed, non-empty, first occurrence wins (case-insensitive)
fn clean_list(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if !out.iter().any(|existing| existing.eq_ignore_ascii_case(value)) {
            out.push(value.to_string());
        }
    }
    out
}

impl CatalogService {
    pub fn new(stores: &Stores, images: Arc<dyn ImageStore>) -> Self {
        Self {
            catalog: stores.catalog.clone(),
            media: MediaService::new(images),
        }
    }

    // ========================================================================
    // Sizes
    // ========================================================================

    pub async fn list_sizes(&self) -> AppResult<Vec<Size>> {
        self.catalog.list_sizes().await
    }

    pub async fn get_size(&self, id: Uuid) -> AppResult<Size> {
        self.catalog.get_size(id).await?.ok_or_else(|| not_found("Size"))
    }

    async fn check_size(&self, input: &SizeInput, exclude: Option<Uuid>) -> AppResult<()> {
        input.validate()?;
        validate_price(input.price).map_err(|m| AppError::validation("price", m))?;
        if self.catalog.size_name_taken(&input.name, exclude).await? {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }
        Ok(())
    }

    pub async fn create_size(&self, input: SizeInput) -> AppResult<Size> {
        self.check_size(&input, None).await?;

        let now = Utc::now();
        let size = Size {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            price: input.price,
            max_varieties: input.max_varieties,
            allowed_varieties: clean_list(&input.allowed_varieties),
            created_at: now,
            updated_at: now,
        };
        self.catalog.insert_size(&size).await?;

        tracing::info!("Created size {} (max {} varieties)", size.name, size.max_varieties);
        Ok(size)
    }

    pub async fn update_size(&self, id: Uuid, input: SizeInput) -> AppResult<Size> {
        let existing = self.get_size(id).await?;
        self.check_size(&input, Some(id)).await?;

        let size = Size {
            name: input.name.trim().to_string(),
            price: input.price,
            max_varieties: input.max_varieties,
            allowed_varieties: clean_list(&input.allowed_varieties),
            updated_at: Utc::now(),
            ..existing
        };
        if !self.catalog.update_size(&size).await? {
            return Err(not_found("Size"));
        }

        tracing::info!("Updated size {}", size.name);
        Ok(size)
    }

    /// Existing batches keep their denormalized size name
    pub async fn delete_size(&self, id: Uuid) -> AppResult<()> {
        if !self.catalog.delete_size(id).await? {
            return Err(not_found("Size"));
        }
        tracing::info!("Deleted size {}", id);
        Ok(())
    }

    // ========================================================================
    // Varieties
    // ========================================================================

    pub async fn list_varieties(&self) -> AppResult<Vec<Variety>> {
        self.catalog.list_varieties().await
    }

    pub async fn create_variety(&self, input: VarietyInput) -> AppResult<Variety> {
        input.validate()?;
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("name", "Variety name is required"));
        }
        if self.catalog.variety_name_taken(&name).await? {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let variety = Variety {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        };
        self.catalog.insert_variety(&variety).await?;

        tracing::info!("Created variety {}", variety.name);
        Ok(variety)
    }

    pub async fn delete_variety(&self, id: Uuid) -> AppResult<()> {
        if !self.catalog.delete_variety(id).await? {
            return Err(not_found("Variety"));
        }
        tracing::info!("Deleted variety {}", id);
        Ok(())
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.catalog.list_categories().await
    }

    pub async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        self.catalog.get_category(id).await?.ok_or_else(|| not_found("Category"))
    }

    pub async fn create_category(&self, input: CategoryInput) -> AppResult<Category> {
        input.validate()?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: clean_optional(input.description),
            image_url: clean_optional(input.image_url),
            created_at: now,
            updated_at: now,
        };
        self.catalog.insert_category(&category).await?;

        tracing::info!("Created category {}", category.name);
        Ok(category)
    }

    pub async fn update_category(&self, id: Uuid, input: CategoryInput) -> AppResult<Category> {
        input.validate()?;
        let existing = self.get_category(id).await?;
        let previous_image = existing.image_url.clone();

        let category = Category {
            name: input.name.trim().to_string(),
            description: clean_optional(input.description),
            image_url: clean_optional(input.image_url),
            updated_at: Utc::now(),
            ..existing
        };
        if !self.catalog.update_category(&category).await? {
            return Err(not_found("Category"));
        }

        self.media
            .discard_replaced(previous_image.as_deref(), category.image_url.as_deref())
            .await;
        tracing::info!("Updated category {}", category.name);
        Ok(category)
    }

    /// Refused while any product still belongs to the category
    pub async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let category = self.get_category(id).await?;

        let products = self.catalog.count_products_in_category(id).await?;
        if products > 0 {
            return Err(AppError::Conflict(format!(
                "Category '{}' still has {} product(s); move or delete them first",
                category.name, products
            )));
        }

        if !self.catalog.delete_category(id).await? {
            return Err(not_found("Category"));
        }

        self.media.discard(category.image_url.as_deref()).await;
        tracing::info!("Deleted category {}", category.name);
        Ok(())
    }

    // ========================================================================
    // Products
    // ========================================================================

    pub async fn list_products(&self, category_id: Option<Uuid>) -> AppResult<Vec<Product>> {
        self.catalog.list_products(category_id).await
    }

    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        self.catalog.get_product(id).await?.ok_or_else(|| not_found("Product"))
    }

    async fn check_product(&self, input: &ProductInput) -> AppResult<()> {
        input.validate()?;
        validate_price(input.price).map_err(|m| AppError::validation("price", m))?;
        if self.catalog.get_category(input.category_id).await?.is_none() {
            return Err(AppError::validation("category_id", "Selected category does not exist"));
        }
        Ok(())
    }

    pub async fn create_product(&self, input: ProductInput) -> AppResult<Product> {
        self.check_product(&input).await?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: clean_optional(input.description),
            category_id: input.category_id,
            price: input.price,
            image_url: clean_optional(input.image_url),
            is_available: input.is_available,
            created_at: now,
            updated_at: now,
        };
        self.catalog.insert_product(&product).await?;

        tracing::info!("Created product {}", product.name);
        Ok(product)
    }

    pub async fn update_product(&self, id: Uuid, input: ProductInput) -> AppResult<Product> {
        let existing = self.get_product(id).await?;
        self.check_product(&input).await?;
        let previous_image = existing.image_url.clone();

        let product = Product {
            name: input.name.trim().to_string(),
            description: clean_optional(input.description),
            category_id: input.category_id,
            price: input.price,
            image_url: clean_optional(input.image_url),
            is_available: input.is_available,
            updated_at: Utc::now(),
            ..existing
        };
        if !self.catalog.update_product(&product).await? {
            return Err(not_found("Product"));
        }

        self.media
            .discard_replaced(previous_image.as_deref(), product.image_url.as_deref())
            .await;
        tracing::info!("Updated product {}", product.name);
        Ok(product)
    }

    pub async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let product = self.get_product(id).await?;
        if !self.catalog.delete_product(id).await? {
            return Err(not_found("Product"));
        }

        self.media.discard(product.image_url.as_deref()).await;
        tracing::info!("Deleted product {}", product.name);
        Ok(())
    }

    // ========================================================================
    // Suppliers
    // ========================================================================

    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        self.catalog.list_suppliers().await
    }

    pub async fn get_supplier(&self, id: Uuid) -> AppResult<Supplier> {
        self.catalog.get_supplier(id).await?.ok_or_else(|| not_found("Supplier"))
    }

    pub async fn create_supplier(&self, input: SupplierInput) -> AppResult<Supplier> {
        input.validate()?;

        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            contact_person: clean_optional(input.contact_person),
            phone: clean_optional(input.phone),
            email: clean_optional(input.email),
            address: clean_optional(input.address),
            supplied_items: clean_list(&input.supplied_items),
            notes: clean_optional(input.notes),
            created_at: now,
            updated_at: now,
        };
        self.catalog.insert_supplier(&supplier).await?;

        tracing::info!("Created supplier {}", supplier.name);
        Ok(supplier)
    }

    pub async fn update_supplier(&self, id: Uuid, input: SupplierInput) -> AppResult<Supplier> {
        input.validate()?;
        let existing = self.get_supplier(id).await?;

        let supplier = Supplier {
            name: input.name.trim().to_string(),
            contact_person: clean_optional(input.contact_person),
            phone: clean_optional(input.phone),
            email: clean_optional(input.email),
            address: clean_optional(input.address),
            supplied_items: clean_list(&input.supplied_items),
            notes: clean_optional(input.notes),
            updated_at: Utc::now(),
            ..existing
        };
        if !self.catalog.update_supplier(&supplier).await? {
            return Err(not_found("Supplier"));
        }

        tracing::info!("Updated supplier {}", supplier.name);
        Ok(supplier)
    }

    pub async fn delete_supplier(&self, id: Uuid) -> AppResult<()> {
        if !self.catalog.delete_supplier(id).await? {
            return Err(not_found("Supplier"));
        }
        tracing::info!("Deleted supplier {}", id);
        Ok(())
    }

    // ========================================================================
    // Damaged goods
    // ========================================================================

    pub async fn list_damaged_goods(&self) -> AppResult<Vec<DamagedGood>> {
        self.catalog.list_damaged_goods().await
    }

    pub async fn get_damaged_good(&self, id: Uuid) -> AppResult<DamagedGood> {
        self.catalog
            .get_damaged_good(id)
            .await?
            .ok_or_else(|| not_found("Damaged goods report"))
    }

    pub async fn report_damaged_good(
        &self,
        reported_by: Option<Uuid>,
        input: DamagedGoodInput,
    ) -> AppResult<DamagedGood> {
        input.validate()?;

        let now = Utc::now();
        let item = DamagedGood {
            id: Uuid::new_v4(),
            product_name: input.product_name.trim().to_string(),
            size_name: clean_optional(input.size_name),
            varieties: clean_list(&input.varieties),
            quantity: input.quantity,
            reason: input.reason.trim().to_string(),
            reported_date: input.reported_date.unwrap_or_else(|| now.date_naive()),
            reported_by,
            image_url: clean_optional(input.image_url),
            remarks: clean_optional(input.remarks),
            created_at: now,
        };
        self.catalog.insert_damaged_good(&item).await?;

        tracing::info!("Recorded {} damaged {}", item.quantity, item.product_name);
        Ok(item)
    }

    pub async fn update_damaged_good(&self, id: Uuid, input: DamagedGoodInput) -> AppResult<DamagedGood> {
        input.validate()?;
        let existing = self.get_damaged_good(id).await?;
        let previous_image = existing.image_url.clone();

        let item = DamagedGood {
            product_name: input.product_name.trim().to_string(),
            size_name: clean_optional(input.size_name),
            varieties: clean_list(&input.varieties),
            quantity: input.quantity,
            reason: input.reason.trim().to_string(),
            reported_date: input.reported_date.unwrap_or(existing.reported_date),
            image_url: clean_optional(input.image_url),
            remarks: clean_optional(input.remarks),
            ..existing
        };
        if !self.catalog.update_damaged_good(&item).await? {
            return Err(not_found("Damaged goods report"));
        }

        self.media
            .discard_replaced(previous_image.as_deref(), item.image_url.as_deref())
            .await;
        Ok(item)
    }

    pub async fn delete_damaged_good(&self, id: Uuid) -> AppResult<()> {
        let item = self.get_damaged_good(id).await?;
        if !self.catalog.delete_damaged_good(id).await? {
            return Err(not_found("Damaged goods report"));
        }

        self.media.discard(item.image_url.as_deref()).await;
        tracing::info!("Deleted damaged goods report {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_list() {
        let cleaned = clean_list(&[
            " Ube ".to_string(),
            "".to_string(),
            "ube".to_string(),
            "Cassava".to_string(),
        ]);
        assert_eq!(cleaned, vec!["Ube".to_string(), "Cassava".to_string()]);
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(Some("  ".to_string())), None);
        assert_eq!(clean_optional(Some(" x ".to_string())).as_deref(), Some("x"));
        assert_eq!(clean_optional(None), None);
    }
}
