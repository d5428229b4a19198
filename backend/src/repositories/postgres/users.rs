use async_trait::async_trait;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use shared::models::{ActivityLog, User};

use super::{constraint_error, PgStore};
use crate::error::AppResult;
use crate::repositories::{RefreshTokenRecord, UserCredentials, UserRepository};

const USER_COLUMNS: &str = "id, email, name, role, status, permissions, created_at, updated_at";

#[async_trait]
impl UserRepository for PgStore {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY email",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_credentials(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let row = sqlx::query(&format!(
            "SELECT {}, password_hash FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(UserCredentials {
            user: User::from_row(&row)?,
            password_hash: row.try_get("password_hash")?,
        }))
    }

    async fn email_taken(&self, email: &str) -> AppResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1))",
        )
        .bind(email.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn insert_user(&self, user: &User, password_hash: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, status, permissions, password_hash,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role)
        .bind(user.status)
        .bind(&user.permissions)
        .bind(password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "email"))?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, role = $3, status = $4, permissions = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.role)
        .bind(user.status)
        .bind(&user.permissions)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn store_refresh_token(&self, record: &RefreshTokenRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token_hash, user_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(&record.token_hash)
        .bind(record.user_id)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn take_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query(
            "DELETE FROM refresh_tokens WHERE token_hash = $1 RETURNING token_hash, user_id, expires_at",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(RefreshTokenRecord {
            token_hash: row.try_get("token_hash")?,
            user_id: row.try_get("user_id")?,
            expires_at: row.try_get("expires_at")?,
        }))
    }

    async fn insert_activity(&self, entry: &ActivityLog) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, actor_id, actor_email, action, detail,
                                       permissions_snapshot, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.actor_id)
        .bind(&entry.actor_email)
        .bind(&entry.action)
        .bind(&entry.detail)
        .bind(&entry.permissions_snapshot)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_activity(&self, limit: u32) -> AppResult<Vec<ActivityLog>> {
        let entries = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, actor_id, actor_email, action, detail, permissions_snapshot, created_at
            FROM activity_logs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
