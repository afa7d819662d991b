//! HTTP API
//!
//! Route groups by aggregate, all JSON, all returning the standard
//! `ApiResponse` envelope. Everything except login sits behind the JWT
//! middleware; handlers receive the caller as a [`Principal`] extension and
//! enforce tenant scoping themselves.

pub mod auth;
pub mod orders;
pub mod products;
pub mod shops;
pub mod tags;
pub mod users;

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::{Json, Router, middleware};
use serde::Serialize;
use shared::error::{ApiResponse, AppError};
use shared::types::Id;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::jwt::auth_middleware;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Paged collection envelope
#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
}

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

fn done() -> ApiResult<()> {
    Ok(Json(ApiResponse::ok()))
}

/// Reject writes against a shop whose validity period has passed.
fn check_shop_active(shop: &shared::models::shop::Shop) -> Result<(), AppError> {
    if shop.is_expired() {
        return Err(AppError::shop_expired());
    }
    Ok(())
}

async fn ensure_shop_active(state: &AppState, shop_id: Id) -> Result<(), AppError> {
    let shop = crate::db::shops::get_shop(&state.pool, shop_id)
        .await
        .map_err(AppError::from)?;
    check_shop_active(&shop)
}

/// Build the full application router.
pub fn router(state: AppState, base_path: &str, allowed_origins: &str) -> Router {
    let public = Router::new()
        .route("/auth/admin/login", post(auth::admin_login))
        .route("/auth/owner/login", post(auth::owner_login))
        .route("/auth/customer/login", post(auth::customer_login));

    let protected = Router::new()
        .route("/shops", post(shops::create_shop).get(shops::list_shops))
        .route(
            "/shops/{shop_id}",
            get(shops::get_shop)
                .put(shops::update_shop)
                .delete(shops::delete_shop),
        )
        .route("/shops/{shop_id}/flow", get(shops::get_flow))
        .route(
            "/shops/{shop_id}/products",
            post(products::create_product).get(products::list_products),
        )
        .route(
            "/shops/{shop_id}/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/shops/{shop_id}/products/{id}/tags",
            get(tags::product_tags).put(tags::set_product_tags),
        )
        .route("/shops/{shop_id}/tags", post(tags::create_tag).get(tags::list_tags))
        .route(
            "/shops/{shop_id}/tags/{id}",
            put(tags::update_tag).delete(tags::delete_tag),
        )
        .route(
            "/shops/{shop_id}/users",
            post(users::create_user).get(users::list_users),
        )
        .route(
            "/shops/{shop_id}/users/{id}",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route(
            "/shops/{shop_id}/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route(
            "/shops/{shop_id}/orders/{id}",
            get(orders::get_order).put(orders::update_order),
        )
        .route(
            "/shops/{shop_id}/orders/{id}/transition",
            post(orders::transition_order),
        )
        .route("/shops/{shop_id}/orders/{id}/logs", get(orders::order_logs))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = public.merge(protected);

    Router::new()
        .nest(base_path, api)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any);

    if allowed_origins.trim() == "*" {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .filter_map(|o| o.trim().parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
