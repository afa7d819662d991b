//! Customer account endpoints
//!
//! Owners manage their shop's customers. A customer may read and update
//! their own account but nobody else's.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use shared::error::AppError;
use shared::models::user::{User, UserCreate, UserUpdate};
use shared::types::Id;

use super::{ApiResult, Paged, ensure_shop_active};
use crate::auth::jwt::Principal;
use crate::auth::password::hash_if_needed;
use crate::db;
use crate::state::AppState;
use crate::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text, validate_text_len,
};

/// Customers may act on their own account; everything else is owner-only.
fn require_self_or_owner(principal: &Principal, shop_id: Id, user_id: Id) -> Result<(), AppError> {
    if let Principal::Customer {
        user_id: own,
        shop_id: own_shop,
    } = principal
        && *own == user_id
        && *own_shop == shop_id
    {
        return Ok(());
    }
    principal.require_owner(shop_id)
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
    Json(data): Json<UserCreate>,
) -> ApiResult<User> {
    principal.require_owner(shop_id)?;
    ensure_shop_active(&state, shop_id).await?;

    validate_required_text(&data.username, "username", MAX_NAME_LEN)?;
    validate_required_text(&data.password, "password", MAX_PASSWORD_LEN)?;
    validate_text_len(&data.nickname, "nickname", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let now = chrono::Utc::now();
    let user = User {
        id: state.ids.generate(),
        shop_id,
        username: data.username.trim().to_string(),
        password: hash_if_needed(&data.password)?,
        nickname: data.nickname,
        phone: data.phone,
        created_at: now,
        updated_at: now,
    };

    db::users::insert_user(&state.pool, &user).await?;
    super::ok(user)
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, Id)>,
) -> ApiResult<User> {
    require_self_or_owner(&principal, shop_id, id)?;
    let user = db::users::get_user(&state.pool, shop_id, id).await?;
    super::ok(user)
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
    Query(query): Query<super::shops::PageQuery>,
) -> ApiResult<Paged<User>> {
    principal.require_owner(shop_id)?;
    let (items, total) =
        db::users::list_users(&state.pool, shop_id, query.page, query.page_size).await?;
    super::ok(Paged { items, total })
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, Id)>,
    Json(mut data): Json<UserUpdate>,
) -> ApiResult<User> {
    require_self_or_owner(&principal, shop_id, id)?;
    ensure_shop_active(&state, shop_id).await?;

    validate_optional_text(&data.password, "password", MAX_PASSWORD_LEN)?;
    validate_optional_text(&data.nickname, "nickname", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    if let Some(password) = &data.password {
        data.password = Some(hash_if_needed(password)?);
    }

    db::users::update_user(&state.pool, shop_id, id, &data).await?;
    let user = db::users::get_user(&state.pool, shop_id, id).await?;
    super::ok(user)
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, Id)>,
) -> ApiResult<()> {
    principal.require_owner(shop_id)?;
    db::users::delete_user(&state.pool, shop_id, id).await?;
    super::done()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn customer_may_touch_own_account_only() {
        let customer = Principal::Customer {
            user_id: Id::new(42),
            shop_id: Id::new(100),
        };
        assert!(require_self_or_owner(&customer, Id::new(100), Id::new(42)).is_ok());

        let err = require_self_or_owner(&customer, Id::new(100), Id::new(43)).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn owner_may_touch_any_account_in_shop() {
        let owner = Principal::ShopOwner {
            shop_id: Id::new(100),
        };
        assert!(require_self_or_owner(&owner, Id::new(100), Id::new(42)).is_ok());

        // foreign shop reads as absence
        let err = require_self_or_owner(&owner, Id::new(200), Id::new(42)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
