//! Route definitions for the Bakery Admin API

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, services::media::MAX_IMAGE_BYTES, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(handlers::me))
        .nest("/sizes", size_routes())
        .nest("/varieties", variety_routes())
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/damaged-goods", damaged_goods_routes())
        .nest("/stock", stock_routes())
        .nest("/orders", order_routes())
        .nest("/payments", payment_routes())
        .nest("/promotions", promotion_routes())
        .nest("/announcements", announcement_routes())
        .nest("/users", user_routes())
        .nest("/reports", report_routes())
        .nest("/media", media_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        .merge(protected)
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
}

fn size_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sizes).post(handlers::create_size))
        .route(
            "/:size_id",
            get(handlers::get_size)
                .put(handlers::update_size)
                .delete(handlers::delete_size),
        )
}

fn variety_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_varieties).post(handlers::create_variety))
        .route("/:variety_id", delete(handlers::delete_variety))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
}

fn damaged_goods_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_damaged_goods).post(handlers::report_damaged_good),
        )
        .route(
            "/:report_id",
            get(handlers::get_damaged_good)
                .put(handlers::update_damaged_good)
                .delete(handlers::delete_damaged_good),
        )
}

/// Stock batches and the ledger
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches).post(handlers::create_batch))
        .route("/movements", get(handlers::list_movements))
        .route("/low", get(handlers::low_stock))
        .route("/expiring", get(handlers::expiring))
        .route(
            "/:batch_id",
            get(handlers::get_batch)
                .put(handlers::update_batch)
                .delete(handlers::delete_batch),
        )
        .route("/:batch_id/adjust", post(handlers::adjust_batch))
        .route("/:batch_id/history", get(handlers::batch_history))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders))
        .route("/stream", get(handlers::order_stream))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", put(handlers::update_status))
        .route("/:order_id/payment-status", put(handlers::update_payment_status))
}

/// Manual payment verification
fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/verifications", get(handlers::list_payment_verifications))
        .route("/verifications/:order_id", post(handlers::verify_payment))
}

fn promotion_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_promotions).post(handlers::create_promotion))
        .route(
            "/:promotion_id",
            get(handlers::get_promotion)
                .put(handlers::update_promotion)
                .delete(handlers::delete_promotion),
        )
}

fn announcement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_announcements).post(handlers::create_announcement),
        )
        .route(
            "/:announcement_id",
            get(handlers::get_announcement)
                .put(handlers::update_announcement)
                .delete(handlers::delete_announcement),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route("/permissions", get(handlers::list_permissions))
        .route("/activity", get(handlers::list_activity))
        .route("/:user_id", get(handlers::get_user).put(handlers::update_user))
        .route("/:user_id/permissions", put(handlers::update_permissions))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::summary))
        .route("/movements", get(handlers::movement_series))
        .route("/stock-by-size", get(handlers::stock_by_size))
}

fn media_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(handlers::upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024)),
        )
        .route("/config", get(handlers::media_config))
}
