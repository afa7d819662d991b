//! Shop administration endpoints
//!
//! Shop CRUD is admin-only, except reads of a single shop and its status
//! flow, which owners and customers of that shop may also perform.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use shared::models::flow::OrderStatusFlow;
use shared::models::shop::{Shop, ShopCreate, ShopUpdate};
use shared::types::Id;

use super::{ApiResult, Paged};
use crate::auth::jwt::Principal;
use crate::auth::password::hash_if_needed;
use crate::db;
use crate::state::AppState;
use crate::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_PASSWORD_LEN,
    MAX_SHORT_TEXT_LEN, MAX_URL_LEN, sanitize_text, validate_optional_text,
    validate_required_text, validate_text_len,
};

#[derive(Debug, serde::Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub async fn create_shop(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(data): Json<ShopCreate>,
) -> ApiResult<Shop> {
    principal.require_admin()?;

    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&data.owner_username, "owner_username", MAX_NAME_LEN)?;
    validate_required_text(&data.owner_password, "owner_password", MAX_PASSWORD_LEN)?;
    validate_text_len(&data.contact_phone, "contact_phone", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&data.contact_email, "contact_email", MAX_EMAIL_LEN)?;
    validate_text_len(&data.address, "address", MAX_ADDRESS_LEN)?;
    validate_text_len(&data.image_url, "image_url", MAX_URL_LEN)?;
    validate_text_len(&data.description, "description", MAX_NOTE_LEN)?;

    let flow = data.order_status_flow.unwrap_or_default();
    flow.validate()?;

    let now = chrono::Utc::now();
    let shop = Shop {
        id: state.ids.generate(),
        name: sanitize_text(&data.name),
        owner_username: data.owner_username.trim().to_string(),
        owner_password: hash_if_needed(&data.owner_password)?,
        contact_phone: data.contact_phone,
        contact_email: data.contact_email,
        address: data.address,
        image_url: data.image_url,
        description: sanitize_text(&data.description),
        valid_until: data.valid_until,
        settings: data.settings.unwrap_or(serde_json::Value::Null),
        order_status_flow: flow,
        created_at: now,
        updated_at: now,
    };

    db::shops::insert_shop(&state.pool, &shop).await?;
    super::ok(shop)
}

pub async fn get_shop(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
) -> ApiResult<Shop> {
    principal.require_shop(shop_id)?;
    let shop = db::shops::get_shop(&state.pool, shop_id).await?;
    super::ok(shop)
}

pub async fn list_shops(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    axum::extract::Query(query): axum::extract::Query<PageQuery>,
) -> ApiResult<Paged<Shop>> {
    principal.require_admin()?;
    let (items, total) = db::shops::list_shops(&state.pool, query.page, query.page_size).await?;
    super::ok(Paged { items, total })
}

pub async fn update_shop(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
    Json(mut data): Json<ShopUpdate>,
) -> ApiResult<Shop> {
    principal.require_admin()?;

    validate_optional_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.owner_password, "owner_password", MAX_PASSWORD_LEN)?;
    validate_optional_text(&data.contact_phone, "contact_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.contact_email, "contact_email", MAX_EMAIL_LEN)?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&data.image_url, "image_url", MAX_URL_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;

    if let Some(flow) = &data.order_status_flow {
        flow.validate()?;
    }
    if let Some(name) = &data.name {
        data.name = Some(sanitize_text(name));
    }
    if let Some(description) = &data.description {
        data.description = Some(sanitize_text(description));
    }
    if let Some(password) = &data.owner_password {
        data.owner_password = Some(hash_if_needed(password)?);
    }

    db::shops::update_shop(&state.pool, shop_id, &data).await?;
    let shop = db::shops::get_shop(&state.pool, shop_id).await?;
    super::ok(shop)
}

pub async fn delete_shop(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
) -> ApiResult<()> {
    principal.require_admin()?;
    db::shops::delete_shop(&state.pool, shop_id).await?;
    super::done()
}

/// The shop's configured order status flow. Customers use this to render
/// the actions available on an order.
pub async fn get_flow(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
) -> ApiResult<OrderStatusFlow> {
    principal.require_shop(shop_id)?;
    let flow = db::shops::get_shop_flow(&state.pool, shop_id).await?;
    super::ok(flow)
}
