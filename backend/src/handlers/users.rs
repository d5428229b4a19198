//! HTTP handlers for user accounts and the activity log

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use shared::models::{
    all_permissions, Action, ActivityLog, CreateUserInput, Module, UpdatePermissionsInput,
    UpdateUserInput, User,
};
use shared::types::ListQuery;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::UserService;
use crate::AppState;

const DEFAULT_ACTIVITY_LIMIT: u32 = 100;

#[derive(Serialize)]
pub struct PermissionCatalog {
    pub permissions: Vec<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<User>>> {
    current_user.0.require(Module::Users, Action::View)?;
    Ok(Json(UserService::new(&state.stores).list_users().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    current_user.0.require(Module::Users, Action::View)?;
    Ok(Json(UserService::new(&state.stores).get_user(user_id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    current_user.0.require(Module::Users, Action::Create)?;
    let user = UserService::new(&state.stores)
        .create_user(Some(&current_user.0), input)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<User>> {
    current_user.0.require(Module::Users, Action::Edit)?;
    let user = UserService::new(&state.stores)
        .update_user(&current_user.0, user_id, input)
        .await?;
    Ok(Json(user))
}

pub async fn update_permissions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdatePermissionsInput>,
) -> AppResult<Json<User>> {
    current_user.0.require(Module::Users, Action::Edit)?;
    let user = UserService::new(&state.stores)
        .update_permissions(&current_user.0, user_id, input)
        .await?;
    Ok(Json(user))
}

/// Every grantable `module:action` identifier
pub async fn list_permissions(current_user: CurrentUser) -> AppResult<Json<PermissionCatalog>> {
    current_user.0.require(Module::Users, Action::View)?;
    Ok(Json(PermissionCatalog {
        permissions: all_permissions(),
    }))
}

pub async fn list_activity(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ActivityLog>>> {
    current_user.0.require(Module::Users, Action::View)?;
    let entries = UserService::new(&state.stores)
        .list_activity(query.limit_or(DEFAULT_ACTIVITY_LIMIT))
        .await?;
    Ok(Json(entries))
}
