//! Dashboard handlers

use axum::{
    extract::{Query, State},
    Json,
};

use shared::models::{Action, Module};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reporting::{DashboardSummary, MovementPoint, SeriesQuery, SizeStock};
use crate::services::ReportingService;
use crate::AppState;

fn service(state: &AppState) -> ReportingService {
    ReportingService::new(&state.stores, &state.config.stock, &state.config.payments)
}

pub async fn summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardSummary>> {
    current_user.0.require(Module::Reports, Action::View)?;
    Ok(Json(service(&state).summary().await?))
}

/// `?days=N`, default 30
pub async fn movement_series(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SeriesQuery>,
) -> AppResult<Json<Vec<MovementPoint>>> {
    current_user.0.require(Module::Reports, Action::View)?;
    Ok(Json(service(&state).movement_series(query.days).await?))
}

pub async fn stock_by_size(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<SizeStock>>> {
    current_user.0.require(Module::Reports, Action::View)?;
    Ok(Json(service(&state).stock_by_size().await?))
}
