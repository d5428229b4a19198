//! HTTP handlers for promotions and announcements

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::models::{Action, Announcement, AnnouncementInput, Module, Promotion, PromotionInput};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ContentService;
use crate::AppState;

fn service(state: &AppState) -> ContentService {
    ContentService::new(&state.stores, state.images.clone())
}

pub async fn list_promotions(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Promotion>>> {
    current_user.0.require(Module::Promotions, Action::View)?;
    Ok(Json(service(&state).list_promotions().await?))
}

pub async fn get_promotion(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(promotion_id): Path<Uuid>,
) -> AppResult<Json<Promotion>> {
    current_user.0.require(Module::Promotions, Action::View)?;
    Ok(Json(service(&state).get_promotion(promotion_id).await?))
}

pub async fn create_promotion(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<PromotionInput>,
) -> AppResult<(StatusCode, Json<Promotion>)> {
    current_user.0.require(Module::Promotions, Action::Create)?;
    let promotion = service(&state).create_promotion(input).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

pub async fn update_promotion(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(promotion_id): Path<Uuid>,
    Json(input): Json<PromotionInput>,
) -> AppResult<Json<Promotion>> {
    current_user.0.require(Module::Promotions, Action::Edit)?;
    Ok(Json(service(&state).update_promotion(promotion_id, input).await?))
}

pub async fn delete_promotion(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(promotion_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require(Module::Promotions, Action::Delete)?;
    service(&state).delete_promotion(promotion_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_announcements(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Announcement>>> {
    current_user.0.require(Module::Announcements, Action::View)?;
    Ok(Json(service(&state).list_announcements().await?))
}

pub async fn get_announcement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(announcement_id): Path<Uuid>,
) -> AppResult<Json<Announcement>> {
    current_user.0.require(Module::Announcements, Action::View)?;
    Ok(Json(service(&state).get_announcement(announcement_id).await?))
}

pub async fn create_announcement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AnnouncementInput>,
) -> AppResult<(StatusCode, Json<Announcement>)> {
    current_user.0.require(Module::Announcements, Action::Create)?;
    let announcement = service(&state).create_announcement(input).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

pub async fn update_announcement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(announcement_id): Path<Uuid>,
    Json(input): Json<AnnouncementInput>,
) -> AppResult<Json<Announcement>> {
    current_user.0.require(Module::Announcements, Action::Edit)?;
    Ok(Json(
        service(&state)
            .update_announcement(announcement_id, input)
            .await?,
    ))
}

pub async fn delete_announcement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(announcement_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require(Module::Announcements, Action::Delete)?;
    service(&state).delete_announcement(announcement_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
