//! User (customer) database operations

use shared::error::{AppError, ErrorCode};
use shared::models::user::{User, UserUpdate};
use shared::types::Id;
use sqlx::PgPool;

use crate::error::{ServiceError, ServiceResult};

pub async fn insert_user(pool: &PgPool, user: &User) -> ServiceResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, shop_id, username, password, nickname, phone, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(user.id)
    .bind(user.shop_id)
    .bind(&user.username)
    .bind(&user.password)
    .bind(&user.nickname)
    .bind(&user.phone)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .map_err(|e| {
        if super::is_unique_violation(&e) {
            ServiceError::App(AppError::new(ErrorCode::UserUsernameExists))
        } else {
            e.into()
        }
    })?;
    Ok(())
}

pub async fn get_user(pool: &PgPool, shop_id: Id, id: Id) -> ServiceResult<User> {
    let user: Option<User> = sqlx::query_as(
        "SELECT id, shop_id, username, password, nickname, phone, created_at, updated_at \
         FROM users WHERE id = $1 AND shop_id = $2",
    )
    .bind(id)
    .bind(shop_id)
    .fetch_optional(pool)
    .await?;
    user.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::UserNotFound)))
}

pub async fn get_user_by_username(
    pool: &PgPool,
    shop_id: Id,
    username: &str,
) -> ServiceResult<Option<User>> {
    let user = sqlx::query_as(
        "SELECT id, shop_id, username, password, nickname, phone, created_at, updated_at \
         FROM users WHERE shop_id = $1 AND username = $2",
    )
    .bind(shop_id)
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn list_users(
    pool: &PgPool,
    shop_id: Id,
    page: Option<u32>,
    page_size: Option<u32>,
) -> ServiceResult<(Vec<User>, i64)> {
    let (limit, offset) = super::page_bounds(page, page_size);

    let users: Vec<User> = sqlx::query_as(
        "SELECT id, shop_id, username, password, nickname, phone, created_at, updated_at \
         FROM users WHERE shop_id = $1 ORDER BY id DESC LIMIT $2 OFFSET $3",
    )
    .bind(shop_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE shop_id = $1")
        .bind(shop_id)
        .fetch_one(pool)
        .await?;

    Ok((users, total))
}

/// Partial update. Password must already be hashed.
pub async fn update_user(pool: &PgPool, shop_id: Id, id: Id, data: &UserUpdate) -> ServiceResult<()> {
    let rows = sqlx::query(
        r#"
        UPDATE users SET
            password = COALESCE($1, password),
            nickname = COALESCE($2, nickname),
            phone = COALESCE($3, phone),
            updated_at = NOW()
        WHERE id = $4 AND shop_id = $5
        "#,
    )
    .bind(&data.password)
    .bind(&data.nickname)
    .bind(&data.phone)
    .bind(id)
    .bind(shop_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(ServiceError::App(AppError::new(ErrorCode::UserNotFound)));
    }
    Ok(())
}

pub async fn delete_user(pool: &PgPool, shop_id: Id, id: Id) -> ServiceResult<()> {
    let rows = sqlx::query("DELETE FROM users WHERE id = $1 AND shop_id = $2")
        .bind(id)
        .bind(shop_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(ServiceError::App(AppError::new(ErrorCode::UserNotFound)));
    }
    Ok(())
}
