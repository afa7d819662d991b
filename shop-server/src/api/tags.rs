//! Tag endpoints
//!
//! Owner-only writes; tag reads are open to everyone in the shop.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use shared::models::tag::{ProductTagsUpdate, Tag, TagCreate, TagUpdate};
use shared::types::Id;

use super::{ApiResult, ensure_shop_active};
use crate::auth::jwt::Principal;
use crate::db;
use crate::state::AppState;
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, sanitize_text, validate_optional_text, validate_required_text,
    validate_text_len,
};

pub async fn create_tag(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
    Json(mut data): Json<TagCreate>,
) -> ApiResult<Tag> {
    principal.require_owner(shop_id)?;
    ensure_shop_active(&state, shop_id).await?;

    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_text_len(&data.description, "description", MAX_NOTE_LEN)?;
    data.name = sanitize_text(&data.name);
    data.description = sanitize_text(&data.description);

    let tag = db::tags::create_tag(&state.pool, shop_id, &data).await?;
    super::ok(tag)
}

pub async fn list_tags(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
) -> ApiResult<Vec<Tag>> {
    principal.require_shop(shop_id)?;
    let tags = db::tags::list_tags(&state.pool, shop_id).await?;
    super::ok(tags)
}

pub async fn update_tag(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, i32)>,
    Json(mut data): Json<TagUpdate>,
) -> ApiResult<Tag> {
    principal.require_owner(shop_id)?;
    ensure_shop_active(&state, shop_id).await?;

    validate_optional_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    if let Some(name) = &data.name {
        data.name = Some(sanitize_text(name));
    }
    if let Some(description) = &data.description {
        data.description = Some(sanitize_text(description));
    }

    db::tags::update_tag(&state.pool, shop_id, id, &data).await?;
    let tag = db::tags::get_tag(&state.pool, shop_id, id).await?;
    super::ok(tag)
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, i32)>,
) -> ApiResult<()> {
    principal.require_owner(shop_id)?;
    db::tags::delete_tag(&state.pool, shop_id, id).await?;
    super::done()
}

/// Tags attached to a product.
pub async fn product_tags(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, product_id)): Path<(Id, Id)>,
) -> ApiResult<Vec<Tag>> {
    principal.require_shop(shop_id)?;
    let tags = db::tags::tags_for_product(&state.pool, shop_id, product_id).await?;
    super::ok(tags)
}

/// Replace a product's tag set.
pub async fn set_product_tags(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, product_id)): Path<(Id, Id)>,
    Json(data): Json<ProductTagsUpdate>,
) -> ApiResult<Vec<Tag>> {
    principal.require_owner(shop_id)?;
    ensure_shop_active(&state, shop_id).await?;

    db::tags::set_product_tags(&state.pool, shop_id, product_id, &data.tag_ids).await?;
    let tags = db::tags::tags_for_product(&state.pool, shop_id, product_id).await?;
    super::ok(tags)
}
