//! Authentication service for sign-in, session refresh and sign-out

use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

use shared::models::{User, UserRole};

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::repositories::{RefreshTokenRecord, Stores, UserRepository};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshInput {
    pub refresh_token: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

/// The signed-in user as seen by the admin UI
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub permissions: Vec<String>,
}

impl From<&User> for SessionInfo {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            permissions: user.effective_permissions(),
        }
    }
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub session: SessionInfo,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Refresh tokens are stored by digest only
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

impl AuthService {
    pub fn new(stores: &Stores, jwt: &JwtConfig) -> Self {
        Self {
            users: stores.users.clone(),
            jwt: jwt.clone(),
        }
    }

    /// Sign in with email and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthTokens> {
        input.validate()?;

        let credentials = self
            .users
            .find_credentials(&input.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &credentials.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            tracing::info!("Failed sign-in for {}", input.email);
            return Err(AppError::InvalidCredentials);
        }

        if !credentials.user.is_active() {
            return Err(AppError::AccountInactive);
        }

        let tokens = self.issue_tokens(&credentials.user).await?;
        tracing::info!("User {} signed in", credentials.user.email);
        Ok(tokens)
    }

    /// Exchange a refresh token for a new token pair. The old refresh token
    /// is consumed.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let record = self
            .users
            .take_refresh_token(&hash_token(refresh_token))
            .await?
            .ok_or(AppError::InvalidToken)?;

        if record.expires_at <= Utc::now() {
            return Err(AppError::TokenExpired);
        }

        let user = self
            .users
            .get_user(record.user_id)
            .await?
            .ok_or(AppError::InvalidToken)?;
        if !user.is_active() {
            return Err(AppError::AccountInactive);
        }

        self.issue_tokens(&user).await
    }

    /// Revoke a refresh token; unknown tokens are ignored
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        if let Some(record) = self.users.take_refresh_token(&hash_token(refresh_token)).await? {
            tracing::info!("User {} signed out", record.user_id);
        }
        Ok(())
    }

    pub async fn session(&self, user_id: Uuid) -> AppResult<SessionInfo> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;
        Ok(SessionInfo::from(&user))
    }

    /// Validate access token and return claims
    pub fn decode_access_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })
    }

    async fn issue_tokens(&self, user: &User) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.jwt.access_token_expiry);
        let refresh_exp = now + Duration::seconds(self.jwt.refresh_token_expiry);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        self.users
            .store_refresh_token(&RefreshTokenRecord {
                token_hash: hash_token(&refresh_token),
                user_id: user.id,
                expires_at: refresh_exp,
            })
            .await?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry,
            session: SessionInfo::from(user),
        })
    }
}
