//! Product catalog endpoints
//!
//! Writes are owner-only and rejected once the shop has expired. Customers
//! may browse; their listings never include offline products.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use shared::models::product::{Product, ProductCreate, ProductQuery, ProductUpdate};
use shared::types::Id;

use super::{ApiResult, Paged, ensure_shop_active};
use crate::auth::jwt::Principal;
use crate::db;
use crate::state::AppState;
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, sanitize_text, validate_optional_text,
    validate_required_text, validate_text_len,
};

fn validate_create(data: &ProductCreate) -> Result<(), shared::error::AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_text_len(&data.description, "description", MAX_NOTE_LEN)?;
    validate_text_len(&data.image_url, "image_url", MAX_URL_LEN)?;
    if data.price.is_negative() {
        return Err(shared::error::AppError::validation("price must not be negative"));
    }
    if data.stock < 0 {
        return Err(shared::error::AppError::validation("stock must not be negative"));
    }
    for cat in &data.option_categories {
        validate_required_text(&cat.name, "option category name", MAX_NAME_LEN)?;
        for opt in &cat.options {
            validate_required_text(&opt.name, "option name", MAX_NAME_LEN)?;
        }
    }
    Ok(())
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
    Json(mut data): Json<ProductCreate>,
) -> ApiResult<Product> {
    principal.require_owner(shop_id)?;
    ensure_shop_active(&state, shop_id).await?;
    validate_create(&data)?;

    data.name = sanitize_text(&data.name);
    data.description = sanitize_text(&data.description);
    for cat in &mut data.option_categories {
        cat.name = sanitize_text(&cat.name);
        for opt in &mut cat.options {
            opt.name = sanitize_text(&opt.name);
        }
    }

    let product = db::products::insert_product(&state.pool, &state.ids, shop_id, &data).await?;
    super::ok(product)
}

pub async fn get_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, Id)>,
) -> ApiResult<Product> {
    principal.require_shop(shop_id)?;
    let product = db::products::get_product(&state.pool, shop_id, id).await?;
    super::ok(product)
}

pub async fn list_products(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(shop_id): Path<Id>,
    Query(mut query): Query<ProductQuery>,
) -> ApiResult<Paged<Product>> {
    principal.require_shop(shop_id)?;
    if matches!(principal, Principal::Customer { .. }) {
        query.exclude_offline = true;
    }
    let (items, total) = db::products::list_products(&state.pool, shop_id, &query).await?;
    super::ok(Paged { items, total })
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, Id)>,
    Json(mut data): Json<ProductUpdate>,
) -> ApiResult<Product> {
    principal.require_owner(shop_id)?;
    ensure_shop_active(&state, shop_id).await?;

    validate_optional_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.image_url, "image_url", MAX_URL_LEN)?;
    if let Some(price) = data.price
        && price.is_negative()
    {
        return Err(shared::error::AppError::validation("price must not be negative").into());
    }
    if let Some(stock) = data.stock
        && stock < 0
    {
        return Err(shared::error::AppError::validation("stock must not be negative").into());
    }
    if let Some(name) = &data.name {
        data.name = Some(sanitize_text(name));
    }
    if let Some(description) = &data.description {
        data.description = Some(sanitize_text(description));
    }

    // Status changes run through the lifecycle check before field updates
    if let Some(next) = data.status {
        let current = db::products::get_product(&state.pool, shop_id, id).await?;
        db::products::set_status(&state.pool, shop_id, id, current.status, next).await?;
    }

    db::products::update_product(&state.pool, shop_id, id, &data).await?;
    let product = db::products::get_product(&state.pool, shop_id, id).await?;
    super::ok(product)
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((shop_id, id)): Path<(Id, Id)>,
) -> ApiResult<()> {
    principal.require_owner(shop_id)?;
    db::products::delete_product(&state.pool, shop_id, id).await?;
    super::done()
}
