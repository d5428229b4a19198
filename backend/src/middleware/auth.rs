//! Session guard
//!
//! Validates the bearer token on every administrative route and resolves
//! the signed-in user's current role and permissions.

use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{permission_key, Action, Module, User, UserRole};

use crate::error::{AppError, AppResult};
use crate::services::AuthService;
use crate::AppState;

/// Authenticated user information
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            permissions: user.permissions.clone(),
        }
    }

    /// Admins hold every permission
    pub fn has_permission(&self, module: Module, action: Action) -> bool {
        self.role == UserRole::Admin || self.permissions.contains(&permission_key(module, action))
    }

    pub fn require(&self, module: Module, action: Action) -> AppResult<()> {
        if self.has_permission(module, action) {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions(permission_key(module, action)))
        }
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

/// Bearer token from the Authorization header, or the `access_token` query
/// parameter for clients that cannot set headers (EventSource)
fn request_token(request: &Request) -> Option<String> {
    if let Some(header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        return header.strip_prefix("Bearer ").map(str::to_string);
    }

    Query::<TokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.access_token)
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = request_token(&request)
        .ok_or_else(|| AppError::Unauthorized("Missing or invalid Authorization header".to_string()))?;

    let claims = AuthService::new(&state.stores, &state.config.jwt).decode_access_token(&token)?;

    // Role, status and permissions are read fresh so changes apply immediately
    let user = state
        .stores
        .users
        .get_user(claims.sub)
        .await?
        .ok_or(AppError::InvalidToken)?;
    if !user.is_active() {
        return Err(AppError::AccountInactive);
    }

    request.extensions_mut().insert(AuthUser::from_user(&user));
    Ok(next.run(request).await)
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(permissions: &[&str]) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "clerk@bakery.ph".to_string(),
            role: UserRole::Staff,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_staff_permissions() {
        let user = staff(&["stock:view", "orders:edit"]);
        assert!(user.has_permission(Module::Stock, Action::View));
        assert!(!user.has_permission(Module::Stock, Action::Edit));
        assert!(matches!(
            user.require(Module::Users, Action::Create),
            Err(AppError::InsufficientPermissions(p)) if p == "users:create"
        ));
    }

    #[test]
    fn test_admin_has_everything() {
        let admin = AuthUser {
            role: UserRole::Admin,
            ..staff(&[])
        };
        assert!(admin.has_permission(Module::Reports, Action::Delete));
    }

    #[test]
    fn test_token_sources() {
        let request = Request::builder()
            .uri("/api/v1/orders/stream?access_token=abc.def")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(request_token(&request).as_deref(), Some("abc.def"));

        let request = Request::builder()
            .uri("/api/v1/orders/stream?since=today&access_token=abc%2Edef%3D%3D")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(request_token(&request).as_deref(), Some("abc.def=="));

        let request = Request::builder()
            .uri("/api/v1/orders/stream?since=today")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(request_token(&request), None);

        let request = Request::builder()
            .uri("/api/v1/orders")
            .header(AUTHORIZATION, "Bearer xyz")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(request_token(&request).as_deref(), Some("xyz"));

        let request = Request::builder()
            .uri("/api/v1/orders")
            .header(AUTHORIZATION, "Basic xyz")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(request_token(&request), None);
    }
}
