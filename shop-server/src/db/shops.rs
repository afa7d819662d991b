//! Shop database operations

use shared::error::{AppError, ErrorCode};
use shared::models::flow::OrderStatusFlow;
use shared::models::shop::{Shop, ShopUpdate};
use shared::types::Id;
use sqlx::PgPool;

use crate::error::{ServiceError, ServiceResult};

const SHOP_COLUMNS: &str = "id, name, owner_username, owner_password, contact_phone, \
     contact_email, address, image_url, description, valid_until, settings, \
     order_status_flow, created_at, updated_at";

pub async fn insert_shop(pool: &PgPool, shop: &Shop) -> ServiceResult<()> {
    let flow = serde_json::to_value(&shop.order_status_flow)?;
    sqlx::query(
        r#"
        INSERT INTO shops (id, name, owner_username, owner_password, contact_phone,
                           contact_email, address, image_url, description, valid_until,
                           settings, order_status_flow, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(shop.id)
    .bind(&shop.name)
    .bind(&shop.owner_username)
    .bind(&shop.owner_password)
    .bind(&shop.contact_phone)
    .bind(&shop.contact_email)
    .bind(&shop.address)
    .bind(&shop.image_url)
    .bind(&shop.description)
    .bind(shop.valid_until)
    .bind(&shop.settings)
    .bind(flow)
    .bind(shop.created_at)
    .bind(shop.updated_at)
    .execute(pool)
    .await
    .map_err(|e| {
        if super::is_unique_violation(&e) {
            ServiceError::App(AppError::new(ErrorCode::OwnerUsernameExists))
        } else {
            e.into()
        }
    })?;
    Ok(())
}

pub async fn get_shop(pool: &PgPool, id: Id) -> ServiceResult<Shop> {
    let shop: Option<Shop> =
        sqlx::query_as(&format!("SELECT {SHOP_COLUMNS} FROM shops WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    shop.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::ShopNotFound)))
}

pub async fn get_shop_by_username(pool: &PgPool, username: &str) -> ServiceResult<Option<Shop>> {
    let shop = sqlx::query_as(&format!(
        "SELECT {SHOP_COLUMNS} FROM shops WHERE owner_username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(shop)
}

pub async fn list_shops(
    pool: &PgPool,
    page: Option<u32>,
    page_size: Option<u32>,
) -> ServiceResult<(Vec<Shop>, i64)> {
    let (limit, offset) = super::page_bounds(page, page_size);

    let shops: Vec<Shop> = sqlx::query_as(&format!(
        "SELECT {SHOP_COLUMNS} FROM shops ORDER BY id DESC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shops")
        .fetch_one(pool)
        .await?;

    Ok((shops, total))
}

/// Partial update. Password must already be hashed; the flow must already
/// be validated.
pub async fn update_shop(pool: &PgPool, id: Id, data: &ShopUpdate) -> ServiceResult<()> {
    let flow = data
        .order_status_flow
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;

    let rows = sqlx::query(
        r#"
        UPDATE shops SET
            name = COALESCE($1, name),
            owner_password = COALESCE($2, owner_password),
            contact_phone = COALESCE($3, contact_phone),
            contact_email = COALESCE($4, contact_email),
            address = COALESCE($5, address),
            image_url = COALESCE($6, image_url),
            description = COALESCE($7, description),
            valid_until = COALESCE($8, valid_until),
            settings = COALESCE($9, settings),
            order_status_flow = COALESCE($10, order_status_flow),
            updated_at = NOW()
        WHERE id = $11
        "#,
    )
    .bind(&data.name)
    .bind(&data.owner_password)
    .bind(&data.contact_phone)
    .bind(&data.contact_email)
    .bind(&data.address)
    .bind(&data.image_url)
    .bind(&data.description)
    .bind(data.valid_until)
    .bind(&data.settings)
    .bind(flow)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(ServiceError::App(AppError::new(ErrorCode::ShopNotFound)));
    }
    Ok(())
}

pub async fn delete_shop(pool: &PgPool, id: Id) -> ServiceResult<()> {
    let rows = sqlx::query("DELETE FROM shops WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(ServiceError::App(AppError::new(ErrorCode::ShopNotFound)));
    }
    Ok(())
}

/// Load just the status flow of a shop.
pub async fn get_shop_flow(pool: &PgPool, id: Id) -> ServiceResult<OrderStatusFlow> {
    let value: Option<serde_json::Value> =
        sqlx::query_scalar("SELECT order_status_flow FROM shops WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    let value = value.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::ShopNotFound)))?;
    Ok(serde_json::from_value(value)?)
}
