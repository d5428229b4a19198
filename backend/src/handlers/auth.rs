//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::auth::{AuthTokens, LoginInput, RefreshInput, SessionInfo};
use crate::services::AuthService;
use crate::AppState;

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(&state.stores, &state.config.jwt);
    let tokens = service.login(body).await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for a new pair
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(&state.stores, &state.config.jwt);
    let tokens = service.refresh(&body.refresh_token).await?;
    Ok(Json(tokens))
}

/// Sign out by revoking the refresh token
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshInput>,
) -> AppResult<StatusCode> {
    let service = AuthService::new(&state.stores, &state.config.jwt);
    service.logout(&body.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current session
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<SessionInfo>> {
    let service = AuthService::new(&state.stores, &state.config.jwt);
    let session = service.session(current_user.0.user_id).await?;
    Ok(Json(session))
}
