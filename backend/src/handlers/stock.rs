//! HTTP handlers for stock batches and the movement ledger

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::models::{
    Action, AdjustStockInput, Module, MovementQuery, StockAlert, StockBatch, StockBatchInput,
    StockBatchOutcome, StockMovement,
};
use shared::types::ListQuery;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::StockService;
use crate::AppState;

fn service(state: &AppState) -> StockService {
    StockService::new(&state.stores, &state.config.stock)
}

pub async fn list_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockBatch>>> {
    current_user.0.require(Module::Stock, Action::View)?;
    Ok(Json(service(&state).list_batches().await?))
}

pub async fn get_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<StockBatch>> {
    current_user.0.require(Module::Stock, Action::View)?;
    Ok(Json(service(&state).get_batch(batch_id).await?))
}

/// Create a batch; the response carries the opening movement and any
/// expiry warning
pub async fn create_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<StockBatchInput>,
) -> AppResult<(StatusCode, Json<StockBatchOutcome>)> {
    current_user.0.require(Module::Stock, Action::Create)?;
    let outcome = service(&state)
        .create_batch(Some(current_user.0.user_id), input)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn update_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<StockBatchInput>,
) -> AppResult<Json<StockBatchOutcome>> {
    current_user.0.require(Module::Stock, Action::Edit)?;
    let outcome = service(&state)
        .update_batch(Some(current_user.0.user_id), batch_id, input)
        .await?;
    Ok(Json(outcome))
}

/// Signed quantity change
pub async fn adjust_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<StockBatchOutcome>> {
    current_user.0.require(Module::Stock, Action::Edit)?;
    let outcome = service(&state)
        .adjust(Some(current_user.0.user_id), batch_id, input)
        .await?;
    Ok(Json(outcome))
}

/// Returns the closing `deleted` movement
pub async fn delete_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<StockMovement>> {
    current_user.0.require(Module::Stock, Action::Delete)?;
    let movement = service(&state)
        .delete_batch(Some(current_user.0.user_id), batch_id)
        .await?;
    Ok(Json(movement))
}

pub async fn list_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    current_user.0.require(Module::Stock, Action::View)?;
    Ok(Json(service(&state).list_movements(&query).await?))
}

pub async fn batch_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    current_user.0.require(Module::Stock, Action::View)?;
    Ok(Json(service(&state).batch_history(batch_id, query.limit).await?))
}

pub async fn low_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockAlert>>> {
    current_user.0.require(Module::Stock, Action::View)?;
    Ok(Json(service(&state).low_stock().await?))
}

pub async fn expiring(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockAlert>>> {
    current_user.0.require(Module::Stock, Action::View)?;
    Ok(Json(service(&state).expiring().await?))
}
