//! User accounts, roles and the permission catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Coarse account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "user_role", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Staff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "user_status", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// An administrative account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub status: UserStatus,
    /// `module:action` identifiers; admins implicitly hold all of them
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Permissions this user effectively holds
    pub fn effective_permissions(&self) -> Vec<String> {
        if self.is_admin() {
            all_permissions()
        } else {
            self.permissions.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePermissionsInput {
    pub permissions: Vec<String>,
}

/// Activity log entry written for every mutating user-management action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ActivityLog {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub actor_email: Option<String>,
    pub action: String,
    pub detail: String,
    /// JSON array of the permission list after the change
    pub permissions_snapshot: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Administrative modules that permissions are granted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Products,
    Categories,
    Sizes,
    Varieties,
    Stock,
    Suppliers,
    DamagedGoods,
    Promotions,
    Announcements,
    Orders,
    Payments,
    Users,
    Reports,
}

impl Module {
    pub const ALL: [Module; 13] = [
        Module::Products,
        Module::Categories,
        Module::Sizes,
        Module::Varieties,
        Module::Stock,
        Module::Suppliers,
        Module::DamagedGoods,
        Module::Promotions,
        Module::Announcements,
        Module::Orders,
        Module::Payments,
        Module::Users,
        Module::Reports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Products => "products",
            Module::Categories => "categories",
            Module::Sizes => "sizes",
            Module::Varieties => "varieties",
            Module::Stock => "stock",
            Module::Suppliers => "suppliers",
            Module::DamagedGoods => "damaged_goods",
            Module::Promotions => "promotions",
            Module::Announcements => "announcements",
            Module::Orders => "orders",
            Module::Payments => "payments",
            Module::Users => "users",
            Module::Reports => "reports",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Edit, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

/// `module:action` identifier stored on user records
pub fn permission_key(module: Module, action: Action) -> String {
    format!("{}:{}", module.as_str(), action.as_str())
}

/// The full permission catalog
pub fn all_permissions() -> Vec<String> {
    Module::ALL
        .iter()
        .flat_map(|m| Action::ALL.iter().map(move |a| permission_key(*m, *a)))
        .collect()
}

pub fn is_known_permission(permission: &str) -> bool {
    let Some((module, action)) = permission.split_once(':') else {
        return false;
    };
    Module::ALL.iter().any(|m| m.as_str() == module)
        && Action::ALL.iter().any(|a| a.as_str() == action)
}
