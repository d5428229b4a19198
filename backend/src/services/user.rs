//! User accounts, permissions and the activity log

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use shared::models::{
    all_permissions, is_known_permission, ActivityLog, CreateUserInput, UpdatePermissionsInput,
    UpdateUserInput, User, UserRole, UserStatus,
};

use super::auth::hash_password;
use crate::config::BootstrapConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::repositories::{Stores, UserRepository};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

/// Deduplicated permission list, rejecting anything outside the catalog
fn checked_permissions(requested: &[String]) -> AppResult<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for permission in requested.iter().map(|p| p.trim()) {
        if !is_known_permission(permission) {
            return Err(AppError::validation(
                "permissions",
                format!("Unknown permission '{}'", permission),
            ));
        }
        if !out.iter().any(|p| p == permission) {
            out.push(permission.to_string());
        }
    }
    Ok(out)
}

/// Stored permission list for a role
fn permissions_for(role: UserRole, requested: &[String]) -> AppResult<Vec<String>> {
    match role {
        UserRole::Admin => Ok(all_permissions()),
        UserRole::Staff => checked_permissions(requested),
    }
}

impl UserService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            users: stores.users.clone(),
        }
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list_users().await
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    async fn log(&self, actor: Option<&AuthUser>, action: &str, detail: String, user: &User) -> AppResult<()> {
        let snapshot = serde_json::to_string(&user.permissions)
            .map_err(|e| AppError::Internal(format!("Permission snapshot failed: {}", e)))?;

        self.users
            .insert_activity(&ActivityLog {
                id: Uuid::new_v4(),
                actor_id: actor.map(|a| a.user_id),
                actor_email: actor.map(|a| a.email.clone()),
                action: action.to_string(),
                detail,
                permissions_snapshot: Some(snapshot),
                created_at: Utc::now(),
            })
            .await
    }

    pub async fn create_user(&self, actor: Option<&AuthUser>, input: CreateUserInput) -> AppResult<User> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.users.email_taken(&email).await? {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            name: input.name.trim().to_string(),
            role: input.role,
            status: UserStatus::Active,
            permissions: permissions_for(input.role, &input.permissions)?,
            created_at: now,
            updated_at: now,
        };
        let password_hash = hash_password(&input.password)?;
        self.users.insert_user(&user, &password_hash).await?;

        self.log(
            actor,
            "user_created",
            format!("Created {:?} account {}", user.role, user.email),
            &user,
        )
        .await?;
        tracing::info!("Created user {}", user.email);
        Ok(user)
    }

    /// Name, role and status. Promotion to admin writes the full catalog.
    pub async fn update_user(&self, actor: &AuthUser, id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        input.validate()?;
        let existing = self.get_user(id).await?;

        if id == actor.user_id && input.status == Some(UserStatus::Inactive) {
            return Err(AppError::Conflict("You cannot deactivate your own account".to_string()));
        }

        let role = input.role.unwrap_or(existing.role);
        let permissions = match (existing.role, role) {
            (_, UserRole::Admin) => all_permissions(),
            // Demoted admins start with nothing until granted
            (UserRole::Admin, UserRole::Staff) => Vec::new(),
            (UserRole::Staff, UserRole::Staff) => existing.permissions.clone(),
        };

        let user = User {
            name: input
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| existing.name.clone()),
            role,
            status: input.status.unwrap_or(existing.status),
            permissions,
            updated_at: Utc::now(),
            ..existing.clone()
        };
        if !self.users.update_user(&user).await? {
            return Err(AppError::NotFound("User".to_string()));
        }

        let mut changes = Vec::new();
        if user.name != existing.name {
            changes.push(format!("name '{}' -> '{}'", existing.name, user.name));
        }
        if user.role != existing.role {
            changes.push(format!("role {:?} -> {:?}", existing.role, user.role));
        }
        if user.status != existing.status {
            changes.push(format!("status {:?} -> {:?}", existing.status, user.status));
        }
        let detail = if changes.is_empty() {
            format!("Saved {} without changes", user.email)
        } else {
            format!("Updated {}: {}", user.email, changes.join(", "))
        };

        self.log(Some(actor), "user_updated", detail, &user).await?;
        tracing::info!("Updated user {}", user.email);
        Ok(user)
    }

    /// Replace a staff member's permission list
    pub async fn update_permissions(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: UpdatePermissionsInput,
    ) -> AppResult<User> {
        let existing = self.get_user(id).await?;
        if existing.is_admin() {
            return Err(AppError::Conflict(
                "Administrators hold every permission; change the role instead".to_string(),
            ));
        }

        let user = User {
            permissions: checked_permissions(&input.permissions)?,
            updated_at: Utc::now(),
            ..existing
        };
        if !self.users.update_user(&user).await? {
            return Err(AppError::NotFound("User".to_string()));
        }

        self.log(
            Some(actor),
            "permissions_updated",
            format!("Set {} permission(s) for {}", user.permissions.len(), user.email),
            &user,
        )
        .await?;
        tracing::info!("Updated permissions for {}", user.email);
        Ok(user)
    }

    /// Newest-first
    pub async fn list_activity(&self, limit: u32) -> AppResult<Vec<ActivityLog>> {
        self.users.list_activity(limit).await
    }

    /// Create the configured administrator when no account uses that email
    pub async fn ensure_admin(&self, bootstrap: &BootstrapConfig) -> AppResult<Option<User>> {
        let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password) else {
            return Ok(None);
        };
        if self.users.email_taken(email).await? {
            return Ok(None);
        }

        let user = self
            .create_user(
                None,
                CreateUserInput {
                    email: email.clone(),
                    name: bootstrap
                        .admin_name
                        .clone()
                        .unwrap_or_else(|| "Administrator".to_string()),
                    password: password.clone(),
                    role: UserRole::Admin,
                    permissions: Vec::new(),
                },
            )
            .await?;
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_permissions() {
        let perms = checked_permissions(&[
            "stock:view".to_string(),
            " stock:view ".to_string(),
            "orders:edit".to_string(),
        ])
        .unwrap();
        assert_eq!(perms, vec!["stock:view".to_string(), "orders:edit".to_string()]);

        assert!(matches!(
            checked_permissions(&["stock:approve".to_string()]),
            Err(AppError::Validation { field, .. }) if field == "permissions"
        ));
    }

    #[test]
    fn test_admin_gets_full_catalog() {
        let perms = permissions_for(UserRole::Admin, &["bogus".to_string()]).unwrap();
        assert_eq!(perms, all_permissions());
    }
}
