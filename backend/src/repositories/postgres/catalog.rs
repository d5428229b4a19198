use async_trait::async_trait;
use uuid::Uuid;

use shared::models::{Category, DamagedGood, Product, Size, Supplier, Variety};

use super::{constraint_error, PgStore};
use crate::error::AppResult;
use crate::repositories::CatalogRepository;

const SIZE_COLUMNS: &str =
    "id, name, price, max_varieties, allowed_varieties, created_at, updated_at";
const CATEGORY_COLUMNS: &str = "id, name, description, image_url, created_at, updated_at";
const PRODUCT_COLUMNS: &str =
    "id, name, description, category_id, price, image_url, is_available, created_at, updated_at";
const SUPPLIER_COLUMNS: &str = "id, name, contact_person, phone, email, address, supplied_items, \
     notes, created_at, updated_at";
const DAMAGED_COLUMNS: &str = "id, product_name, size_name, varieties, quantity, reason, \
     reported_date, reported_by, image_url, remarks, created_at";

#[async_trait]
impl CatalogRepository for PgStore {
    async fn list_sizes(&self) -> AppResult<Vec<Size>> {
        let sizes = sqlx::query_as::<_, Size>(&format!(
            "SELECT {} FROM sizes ORDER BY lower(name)",
            SIZE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(sizes)
    }

    async fn get_size(&self, id: Uuid) -> AppResult<Option<Size>> {
        let size = sqlx::query_as::<_, Size>(&format!("SELECT {} FROM sizes WHERE id = $1", SIZE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(size)
    }

    async fn size_name_taken(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sizes WHERE lower(name) = lower($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name.trim())
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn insert_size(&self, size: &Size) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sizes (id, name, price, max_varieties, allowed_varieties, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(size.id)
        .bind(&size.name)
        .bind(size.price)
        .bind(size.max_varieties)
        .bind(&size.allowed_varieties)
        .bind(size.created_at)
        .bind(size.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "name"))?;
        Ok(())
    }

    async fn update_size(&self, size: &Size) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sizes
            SET name = $2, price = $3, max_varieties = $4, allowed_varieties = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(size.id)
        .bind(&size.name)
        .bind(size.price)
        .bind(size.max_varieties)
        .bind(&size.allowed_varieties)
        .bind(size.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "name"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_size(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sizes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_varieties(&self) -> AppResult<Vec<Variety>> {
        let varieties = sqlx::query_as::<_, Variety>(
            "SELECT id, name, created_at FROM varieties ORDER BY lower(name)",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(varieties)
    }

    async fn variety_name_taken(&self, name: &str) -> AppResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM varieties WHERE lower(name) = lower($1))",
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn insert_variety(&self, variety: &Variety) -> AppResult<()> {
        sqlx::query("INSERT INTO varieties (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(variety.id)
            .bind(&variety.name)
            .bind(variety.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "name"))?;
        Ok(())
    }

    async fn delete_variety(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM varieties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories ORDER BY lower(name)",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn insert_category(&self, category: &Category) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.image_url)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = $2, description = $3, image_url = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.image_url)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "Category"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_products_in_category(&self, category_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_products(&self, category_id: Option<Uuid>) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE ($1::uuid IS NULL OR category_id = $1) ORDER BY lower(name)",
            PRODUCT_COLUMNS
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn insert_product(&self, product: &Product) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, category_id, price, image_url, is_available,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.price)
        .bind(&product.image_url)
        .bind(product.is_available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "category_id"))?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, category_id = $4, price = $5, image_url = $6,
                is_available = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.price)
        .bind(&product.image_url)
        .bind(product.is_available)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "category_id"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers ORDER BY lower(name)",
            SUPPLIER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(suppliers)
    }

    async fn get_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers WHERE id = $1",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(supplier)
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact_person, phone, email, address, supplied_items,
                                   notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.supplied_items)
        .bind(&supplier.notes)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_supplier(&self, supplier: &Supplier) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = $2, contact_person = $3, phone = $4, email = $5, address = $6,
                supplied_items = $7, notes = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.supplied_items)
        .bind(&supplier.notes)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_supplier(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_damaged_goods(&self) -> AppResult<Vec<DamagedGood>> {
        let items = sqlx::query_as::<_, DamagedGood>(&format!(
            "SELECT {} FROM damaged_goods ORDER BY reported_date DESC, created_at DESC",
            DAMAGED_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn get_damaged_good(&self, id: Uuid) -> AppResult<Option<DamagedGood>> {
        let item = sqlx::query_as::<_, DamagedGood>(&format!(
            "SELECT {} FROM damaged_goods WHERE id = $1",
            DAMAGED_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn insert_damaged_good(&self, item: &DamagedGood) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO damaged_goods (id, product_name, size_name, varieties, quantity, reason,
                                       reported_date, reported_by, image_url, remarks, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(item.id)
        .bind(&item.product_name)
        .bind(&item.size_name)
        .bind(&item.varieties)
        .bind(item.quantity)
        .bind(&item.reason)
        .bind(item.reported_date)
        .bind(item.reported_by)
        .bind(&item.image_url)
        .bind(&item.remarks)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_damaged_good(&self, item: &DamagedGood) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE damaged_goods
            SET product_name = $2, size_name = $3, varieties = $4, quantity = $5, reason = $6,
                reported_date = $7, image_url = $8, remarks = $9
            WHERE id = $1
            "#,
        )
        .bind(item.id)
        .bind(&item.product_name)
        .bind(&item.size_name)
        .bind(&item.varieties)
        .bind(item.quantity)
        .bind(&item.reason)
        .bind(item.reported_date)
        .bind(&item.image_url)
        .bind(&item.remarks)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_damaged_good(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM damaged_goods WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
