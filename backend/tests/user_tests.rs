//! User management and authentication tests
//!
//! Role and permission writes, the activity log, sign-in, refresh rotation
//! and sign-out.

mod common;

use serde_json::Value;

use bakery_admin::config::BootstrapConfig;
use bakery_admin::error::AppError;
use bakery_admin::middleware::AuthUser;
use bakery_admin::services::auth::LoginInput;
use bakery_admin::services::AuthService;
use common::TestContext;
use shared::models::{
    all_permissions, CreateUserInput, UpdatePermissionsInput, UpdateUserInput, User, UserRole,
    UserStatus,
};

fn staff_input(email: &str, permissions: &[&str]) -> CreateUserInput {
    CreateUserInput {
        email: email.to_string(),
        name: "Counter Staff".to_string(),
        password: "pandesal123".to_string(),
        role: UserRole::Staff,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }
}

async fn owner(ctx: &TestContext) -> User {
    ctx.users()
        .create_user(
            None,
            CreateUserInput {
                email: "owner@bakery.ph".to_string(),
                name: "Owner".to_string(),
                password: "bibingka-2024".to_string(),
                role: UserRole::Admin,
                permissions: Vec::new(),
            },
        )
        .await
        .unwrap()
}

fn login(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.to_string(),
        password: password.to_string(),
    }
}

// ============================================================================
// Accounts and permissions
// ============================================================================

#[tokio::test]
async fn test_admin_written_with_full_catalog() {
    let ctx = TestContext::new();
    let admin = owner(&ctx).await;
    assert_eq!(admin.permissions, all_permissions());
    assert_eq!(admin.status, UserStatus::Active);
}

#[tokio::test]
async fn test_unknown_permissions_rejected() {
    let ctx = TestContext::new();
    let result = ctx
        .users()
        .create_user(None, staff_input("clerk@bakery.ph", &["stock:view", "ovens:fire"]))
        .await;
    assert!(matches!(result, Err(AppError::Validation { field, .. }) if field == "permissions"));
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let ctx = TestContext::new();
    let users = ctx.users();
    users
        .create_user(None, staff_input("clerk@bakery.ph", &[]))
        .await
        .unwrap();
    let again = users
        .create_user(None, staff_input("Clerk@Bakery.ph", &[]))
        .await;
    assert!(matches!(again, Err(AppError::DuplicateEntry(_))));
}

#[tokio::test]
async fn test_promotion_and_permission_rules() {
    let ctx = TestContext::new();
    let admin = AuthUser::from_user(&owner(&ctx).await);
    let users = ctx.users();

    let clerk = users
        .create_user(Some(&admin), staff_input("clerk@bakery.ph", &["stock:view"]))
        .await
        .unwrap();

    let updated = users
        .update_permissions(
            &admin,
            clerk.id,
            UpdatePermissionsInput {
                permissions: vec!["stock:view".to_string(), "stock:edit".to_string()],
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.permissions.len(), 2);

    let promoted = users
        .update_user(
            &admin,
            clerk.id,
            UpdateUserInput {
                name: None,
                role: Some(UserRole::Admin),
                status: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.permissions, all_permissions());

    let refused = users
        .update_permissions(
            &admin,
            clerk.id,
            UpdatePermissionsInput {
                permissions: vec!["stock:view".to_string()],
            },
        )
        .await;
    assert!(matches!(refused, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_cannot_deactivate_self() {
    let ctx = TestContext::new();
    let admin_user = owner(&ctx).await;
    let admin = AuthUser::from_user(&admin_user);

    let result = ctx
        .users()
        .update_user(
            &admin,
            admin_user.id,
            UpdateUserInput {
                name: None,
                role: None,
                status: Some(UserStatus::Inactive),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_activity_log_records_every_write() {
    let ctx = TestContext::new();
    let admin = AuthUser::from_user(&owner(&ctx).await);
    let users = ctx.users();

    let clerk = users
        .create_user(Some(&admin), staff_input("clerk@bakery.ph", &["orders:view"]))
        .await
        .unwrap();
    users
        .update_permissions(
            &admin,
            clerk.id,
            UpdatePermissionsInput {
                permissions: vec!["orders:view".to_string(), "orders:edit".to_string()],
            },
        )
        .await
        .unwrap();

    let log = users.list_activity(10).await.unwrap();
    // owner, clerk, permission change
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].action, "permissions_updated");
    assert_eq!(log[0].actor_email.as_deref(), Some("owner@bakery.ph"));

    let snapshot: Value = serde_json::from_str(log[0].permissions_snapshot.as_deref().unwrap()).unwrap();
    assert_eq!(snapshot, serde_json::json!(["orders:view", "orders:edit"]));

    assert_eq!(users.list_activity(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_bootstrap_admin_created_once() {
    let ctx = TestContext::new();
    let bootstrap = BootstrapConfig {
        admin_email: Some("owner@bakery.ph".to_string()),
        admin_password: Some("bibingka-2024".to_string()),
        admin_name: None,
    };

    let created = ctx.users().ensure_admin(&bootstrap).await.unwrap();
    assert_eq!(created.map(|u| u.role), Some(UserRole::Admin));
    assert!(ctx.users().ensure_admin(&bootstrap).await.unwrap().is_none());
    assert!(ctx
        .users()
        .ensure_admin(&BootstrapConfig::default())
        .await
        .unwrap()
        .is_none());
}

// ============================================================================
// Sign-in and sessions
// ============================================================================

#[tokio::test]
async fn test_login_refresh_logout() {
    let ctx = TestContext::new();
    let admin = owner(&ctx).await;
    let auth = AuthService::new(&ctx.stores, &ctx.config.jwt);

    let wrong = auth.login(login("owner@bakery.ph", "nope-nope")).await;
    assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

    let tokens = auth.login(login("owner@bakery.ph", "bibingka-2024")).await.unwrap();
    assert_eq!(tokens.session.user_id, admin.id);
    let claims = auth.decode_access_token(&tokens.access_token).unwrap();
    assert_eq!(claims.sub, admin.id);

    // Refresh tokens rotate
    let rotated = auth.refresh(&tokens.refresh_token).await.unwrap();
    assert!(matches!(
        auth.refresh(&tokens.refresh_token).await,
        Err(AppError::InvalidToken)
    ));

    auth.logout(&rotated.refresh_token).await.unwrap();
    assert!(matches!(
        auth.refresh(&rotated.refresh_token).await,
        Err(AppError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_inactive_user_cannot_sign_in() {
    let ctx = TestContext::new();
    let admin = AuthUser::from_user(&owner(&ctx).await);
    let users = ctx.users();
    let clerk = users
        .create_user(Some(&admin), staff_input("clerk@bakery.ph", &[]))
        .await
        .unwrap();
    users
        .update_user(
            &admin,
            clerk.id,
            UpdateUserInput {
                name: None,
                role: None,
                status: Some(UserStatus::Inactive),
            },
        )
        .await
        .unwrap();

    let auth = AuthService::new(&ctx.stores, &ctx.config.jwt);
    let result = auth.login(login("clerk@bakery.ph", "pandesal123")).await;
    assert!(matches!(result, Err(AppError::AccountInactive)));
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let ctx = TestContext::new();
    let auth = AuthService::new(&ctx.stores, &ctx.config.jwt);
    assert!(matches!(
        auth.decode_access_token("not.a.token"),
        Err(AppError::InvalidToken)
    ));
}
