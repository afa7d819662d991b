//! Login endpoints
//!
//! Three principals, three endpoints, one token format. Failed lookups and
//! failed password checks produce the same `InvalidCredentials` error so
//! the response does not reveal which usernames exist.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::types::Id;

use super::ApiResult;
use crate::auth::jwt::{Principal, create_token};
use crate::auth::password::{constant_time_eq, is_bcrypt_hash, verify_password};
use crate::db;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerLoginRequest {
    pub shop_id: Id,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Id>,
}

fn issue(state: &AppState, principal: &Principal) -> Result<String, AppError> {
    create_token(principal, &state.jwt_secret, state.jwt_expiration_hours).map_err(|e| {
        tracing::error!("Token creation failed: {e}");
        AppError::internal("Token creation failed")
    })
}

pub async fn admin_login(
    State(state): State<AppState>,
    Json(data): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let password_ok = if is_bcrypt_hash(&state.admin_password) {
        verify_password(&data.password, &state.admin_password)
    } else {
        constant_time_eq(&data.password, &state.admin_password)
    };
    if data.username != state.admin_username || !password_ok {
        return Err(AppError::invalid_credentials());
    }

    let token = issue(&state, &Principal::Admin)?;
    super::ok(LoginResponse {
        token,
        role: "admin",
        shop_id: None,
        user_id: None,
    })
}

pub async fn owner_login(
    State(state): State<AppState>,
    Json(data): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let shop = db::shops::get_shop_by_username(&state.pool, &data.username)
        .await
        .map_err(AppError::from)?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&data.password, &shop.owner_password) {
        return Err(AppError::invalid_credentials());
    }

    let principal = Principal::ShopOwner { shop_id: shop.id };
    let token = issue(&state, &principal)?;
    super::ok(LoginResponse {
        token,
        role: "owner",
        shop_id: Some(shop.id),
        user_id: None,
    })
}

pub async fn customer_login(
    State(state): State<AppState>,
    Json(data): Json<CustomerLoginRequest>,
) -> ApiResult<LoginResponse> {
    let user = db::users::get_user_by_username(&state.pool, data.shop_id, &data.username)
        .await
        .map_err(AppError::from)?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&data.password, &user.password) {
        return Err(AppError::invalid_credentials());
    }

    let principal = Principal::Customer {
        user_id: user.id,
        shop_id: user.shop_id,
    };
    let token = issue(&state, &principal)?;
    super::ok(LoginResponse {
        token,
        role: "customer",
        shop_id: Some(user.shop_id),
        user_id: Some(user.id),
    })
}
