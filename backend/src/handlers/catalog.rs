//! HTTP handlers for sizes, varieties, categories, products, suppliers and
//! damaged-goods reports

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::models::{
    Action, Category, CategoryInput, DamagedGood, DamagedGoodInput, Module, Product, ProductInput,
    ProductQuery, Size, SizeInput, Supplier, SupplierInput, Variety, VarietyInput,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::CatalogService;
use crate::AppState;

fn service(state: &AppState) -> CatalogService {
    CatalogService::new(&state.stores, state.images.clone())
}

// ============================================================================
// Sizes
// ============================================================================

pub async fn list_sizes(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Size>>> {
    current_user.0.require(Module::Sizes, Action::View)?;
    Ok(Json(service(&state).list_sizes().await?))
}

pub async fn get_size(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(size_id): Path<Uuid>,
) -> AppResult<Json<Size>> {
    current_user.0.require(Module::Sizes, Action::View)?;
    Ok(Json(service(&state).get_size(size_id).await?))
}

pub async fn create_size(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SizeInput>,
) -> AppResult<(StatusCode, Json<Size>)> {
    current_user.0.require(Module::Sizes, Action::Create)?;
    let size = service(&state).create_size(input).await?;
    Ok((StatusCode::CREATED, Json(size)))
}

pub async fn update_size(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(size_id): Path<Uuid>,
    Json(input): Json<SizeInput>,
) -> AppResult<Json<Size>> {
    current_user.0.require(Module::Sizes, Action::Edit)?;
    Ok(Json(service(&state).update_size(size_id, input).await?))
}

pub async fn delete_size(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(size_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require(Module::Sizes, Action::Delete)?;
    service(&state).delete_size(size_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Varieties
// ============================================================================

pub async fn list_varieties(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Variety>>> {
    current_user.0.require(Module::Varieties, Action::View)?;
    Ok(Json(service(&state).list_varieties().await?))
}

pub async fn create_variety(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<VarietyInput>,
) -> AppResult<(StatusCode, Json<Variety>)> {
    current_user.0.require(Module::Varieties, Action::Create)?;
    let variety = service(&state).create_variety(input).await?;
    Ok((StatusCode::CREATED, Json(variety)))
}

pub async fn delete_variety(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(variety_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require(Module::Varieties, Action::Delete)?;
    service(&state).delete_variety(variety_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Categories
// ============================================================================

pub async fn list_categories(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Category>>> {
    current_user.0.require(Module::Categories, Action::View)?;
    Ok(Json(service(&state).list_categories().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    current_user.0.require(Module::Categories, Action::View)?;
    Ok(Json(service(&state).get_category(category_id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    current_user.0.require(Module::Categories, Action::Create)?;
    let category = service(&state).create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    current_user.0.require(Module::Categories, Action::Edit)?;
    Ok(Json(service(&state).update_category(category_id, input).await?))
}

/// Refused with 409 while products reference the category
pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require(Module::Categories, Action::Delete)?;
    service(&state).delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Products
// ============================================================================

pub async fn list_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    current_user.0.require(Module::Products, Action::View)?;
    Ok(Json(service(&state).list_products(query.category_id).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    current_user.0.require(Module::Products, Action::View)?;
    Ok(Json(service(&state).get_product(product_id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    current_user.0.require(Module::Products, Action::Create)?;
    let product = service(&state).create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    current_user.0.require(Module::Products, Action::Edit)?;
    Ok(Json(service(&state).update_product(product_id, input).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require(Module::Products, Action::Delete)?;
    service(&state).delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Suppliers
// ============================================================================

pub async fn list_suppliers(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Supplier>>> {
    current_user.0.require(Module::Suppliers, Action::View)?;
    Ok(Json(service(&state).list_suppliers().await?))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    current_user.0.require(Module::Suppliers, Action::View)?;
    Ok(Json(service(&state).get_supplier(supplier_id).await?))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    current_user.0.require(Module::Suppliers, Action::Create)?;
    let supplier = service(&state).create_supplier(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<SupplierInput>,
) -> AppResult<Json<Supplier>> {
    current_user.0.require(Module::Suppliers, Action::Edit)?;
    Ok(Json(service(&state).update_supplier(supplier_id, input).await?))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require(Module::Suppliers, Action::Delete)?;
    service(&state).delete_supplier(supplier_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Damaged goods
// ============================================================================

pub async fn list_damaged_goods(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<DamagedGood>>> {
    current_user.0.require(Module::DamagedGoods, Action::View)?;
    Ok(Json(service(&state).list_damaged_goods().await?))
}

pub async fn get_damaged_good(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<DamagedGood>> {
    current_user.0.require(Module::DamagedGoods, Action::View)?;
    Ok(Json(service(&state).get_damaged_good(report_id).await?))
}

pub async fn report_damaged_good(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<DamagedGoodInput>,
) -> AppResult<(StatusCode, Json<DamagedGood>)> {
    current_user.0.require(Module::DamagedGoods, Action::Create)?;
    let report = service(&state)
        .report_damaged_good(Some(current_user.0.user_id), input)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn update_damaged_good(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(report_id): Path<Uuid>,
    Json(input): Json<DamagedGoodInput>,
) -> AppResult<Json<DamagedGood>> {
    current_user.0.require(Module::DamagedGoods, Action::Edit)?;
    Ok(Json(service(&state).update_damaged_good(report_id, input).await?))
}

pub async fn delete_damaged_good(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(report_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require(Module::DamagedGoods, Action::Delete)?;
    service(&state).delete_damaged_good(report_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
