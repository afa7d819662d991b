//! Order endpoints
//!
//! Customers place orders for themselves; owners may place them on a
//! customer's behalf. Every read is tenant-scoped and customers only ever
//! see their own orders.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::order::{Order, OrderCreate, OrderQuery, OrderStatusLog, OrderTransition, OrderUpdate};
use shared::types::Id;

use super::{ApiResult, Paged};
use crate::auth::jwt::Principal;
use crate::db;
use crate::state::AppState;
use crate::validation::{MAX_NOTE_LEN, sanitize_text, validate_text_len};

pub async fn create_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
    Json(mut data): Json<OrderCreate>,
) -> ApiResult<Order> {
    principal.require_shop(shop_id)?;
    if let Principal::Customer { user_id, .. } = &principal {
        // Customers order for themselves regardless of the payload
        data.user_id = *user_id;
    }

    let shop = db::shops::get_shop(&state.pool, shop_id).await?;
    if shop.is_expired() {
        return Err(AppError::shop_expired());
    }

    validate_text_len(&data.remark, "remark", MAX_NOTE_LEN)?;
    let remark = sanitize_text(&data.remark);

    // The user must exist in this shop
    db::users::get_user(&state.pool, shop_id, data.user_id).await?;

    let order = db::orders::create_order(
        &state.pool,
        &state.ids,
        shop_id,
        data.user_id,
        remark,
        &data.items,
        &shop.order_status_flow,
    )
    .await?;
    super::ok(order)
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, Id)>,
) -> ApiResult<Order> {
    principal.require_shop(shop_id)?;
    let order = db::orders::get_order(&state.pool, shop_id, id).await?;
    if let Principal::Customer { user_id, .. } = &principal
        && order.user_id != *user_id
    {
        return Err(AppError::new(ErrorCode::OrderNotFound));
    }
    super::ok(order)
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
    Query(mut query): Query<OrderQuery>,
) -> ApiResult<Paged<Order>> {
    principal.require_shop(shop_id)?;
    if let Principal::Customer { user_id, .. } = &principal {
        query.user_id = Some(*user_id);
    }
    let (items, total) = db::orders::list_orders(&state.pool, shop_id, &query).await?;
    super::ok(Paged { items, total })
}

/// Only the remark is mutable after creation; the snapshot never is.
pub async fn update_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, Id)>,
    Json(data): Json<OrderUpdate>,
) -> ApiResult<Order> {
    principal.require_owner(shop_id)?;

    let remark = match &data.remark {
        Some(r) => {
            validate_text_len(r, "remark", MAX_NOTE_LEN)?;
            Some(sanitize_text(r))
        }
        None => None,
    };

    db::orders::update_remark(&state.pool, shop_id, id, remark.as_deref()).await?;
    let order = db::orders::get_order(&state.pool, shop_id, id).await?;
    super::ok(order)
}

pub async fn transition_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, Id)>,
    Json(data): Json<OrderTransition>,
) -> ApiResult<Order> {
    principal.require_shop(shop_id)?;
    if let Principal::Customer { user_id, .. } = &principal {
        // Customers may only act on their own orders
        let order = db::orders::get_order(&state.pool, shop_id, id).await?;
        if order.user_id != *user_id {
            return Err(AppError::new(ErrorCode::OrderNotFound));
        }
    }

    // Transitions are writes; expired shops only read
    super::ensure_shop_active(&state, shop_id).await?;

    let flow = db::shops::get_shop_flow(&state.pool, shop_id).await?;
    let order =
        db::orders::transition_status(&state.pool, &state.ids, shop_id, id, data.next_status, &flow)
            .await?;
    super::ok(order)
}

/// Status change history, oldest first.
pub async fn order_logs(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, Id)>,
) -> ApiResult<Vec<OrderStatusLog>> {
    principal.require_shop(shop_id)?;
    if let Principal::Customer { user_id, .. } = &principal {
        let order = db::orders::get_order(&state.pool, shop_id, id).await?;
        if order.user_id != *user_id {
            return Err(AppError::new(ErrorCode::OrderNotFound));
        }
    }
    let logs = db::orders::list_status_logs(&state.pool, shop_id, id).await?;
    super::ok(logs)
}
