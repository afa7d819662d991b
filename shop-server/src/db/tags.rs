//! Tag database operations
//!
//! Tags use an auto-increment integer id within a per-shop namespace. The
//! product/tag relation is maintained as a symmetric difference: replacing a
//! product's tag set inserts only the missing pairs and deletes only the
//! stale ones, so identical inputs are idempotent.

use std::collections::HashSet;

use shared::error::{AppError, ErrorCode};
use shared::models::tag::{Tag, TagCreate, TagUpdate};
use shared::types::Id;
use sqlx::PgPool;

use crate::error::{ServiceError, ServiceResult};

pub async fn create_tag(pool: &PgPool, shop_id: Id, data: &TagCreate) -> ServiceResult<Tag> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO tags (shop_id, name, description) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(shop_id)
    .bind(&data.name)
    .bind(&data.description)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if super::is_unique_violation(&e) {
            ServiceError::App(AppError::new(ErrorCode::TagNameExists))
        } else {
            e.into()
        }
    })?;

    Ok(Tag {
        id,
        shop_id,
        name: data.name.clone(),
        description: data.description.clone(),
    })
}

pub async fn get_tag(pool: &PgPool, shop_id: Id, id: i32) -> ServiceResult<Tag> {
    let tag: Option<Tag> = sqlx::query_as(
        "SELECT id, shop_id, name, description FROM tags WHERE id = $1 AND shop_id = $2",
    )
    .bind(id)
    .bind(shop_id)
    .fetch_optional(pool)
    .await?;
    tag.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::TagNotFound)))
}

pub async fn list_tags(pool: &PgPool, shop_id: Id) -> ServiceResult<Vec<Tag>> {
    let tags = sqlx::query_as(
        "SELECT id, shop_id, name, description FROM tags WHERE shop_id = $1 ORDER BY id",
    )
    .bind(shop_id)
    .fetch_all(pool)
    .await?;
    Ok(tags)
}

pub async fn update_tag(
    pool: &PgPool,
    shop_id: Id,
    id: i32,
    data: &TagUpdate,
) -> ServiceResult<()> {
    let rows = sqlx::query(
        "UPDATE tags SET name = COALESCE($1, name), description = COALESCE($2, description) \
         WHERE id = $3 AND shop_id = $4",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(id)
    .bind(shop_id)
    .execute(pool)
    .await
    .map_err(|e| {
        if super::is_unique_violation(&e) {
            ServiceError::App(AppError::new(ErrorCode::TagNameExists))
        } else {
            e.into()
        }
    })?;

    if rows.rows_affected() == 0 {
        return Err(ServiceError::App(AppError::new(ErrorCode::TagNotFound)));
    }
    Ok(())
}

pub async fn delete_tag(pool: &PgPool, shop_id: Id, id: i32) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM product_tags WHERE tag_id = $1 \
         AND product_id IN (SELECT id FROM products WHERE shop_id = $2)",
    )
    .bind(id)
    .bind(shop_id)
    .execute(&mut *tx)
    .await?;

    let rows = sqlx::query("DELETE FROM tags WHERE id = $1 AND shop_id = $2")
        .bind(id)
        .bind(shop_id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(ServiceError::App(AppError::new(ErrorCode::TagNotFound)));
    }

    tx.commit().await?;
    Ok(())
}

/// Tags currently attached to a product.
pub async fn tags_for_product(
    pool: &PgPool,
    shop_id: Id,
    product_id: Id,
) -> ServiceResult<Vec<Tag>> {
    let tags = sqlx::query_as(
        r#"
        SELECT t.id, t.shop_id, t.name, t.description
        FROM tags t
        JOIN product_tags pt ON pt.tag_id = t.id
        WHERE pt.product_id = $1 AND t.shop_id = $2
        ORDER BY t.id
        "#,
    )
    .bind(product_id)
    .bind(shop_id)
    .fetch_all(pool)
    .await?;
    Ok(tags)
}

/// Replace a product's tag set in one transaction.
///
/// Every requested tag must belong to the product's shop; a foreign tag id
/// fails the whole operation with `TagShopMismatch`.
pub async fn set_product_tags(
    pool: &PgPool,
    shop_id: Id,
    product_id: Id,
    tag_ids: &[i32],
) -> ServiceResult<()> {
    let requested: HashSet<i32> = tag_ids.iter().copied().collect();

    let mut tx = pool.begin().await?;

    let exists: Option<i64> =
        sqlx::query_scalar("SELECT id FROM products WHERE id = $1 AND shop_id = $2")
            .bind(product_id)
            .bind(shop_id)
            .fetch_optional(&mut *tx)
            .await?;
    if exists.is_none() {
        return Err(ServiceError::App(AppError::new(ErrorCode::ProductNotFound)));
    }

    if !requested.is_empty() {
        let ids: Vec<i32> = requested.iter().copied().collect();
        let known: Vec<i32> =
            sqlx::query_scalar("SELECT id FROM tags WHERE shop_id = $1 AND id = ANY($2)")
                .bind(shop_id)
                .bind(&ids)
                .fetch_all(&mut *tx)
                .await?;
        if known.len() != requested.len() {
            let known: HashSet<i32> = known.into_iter().collect();
            let missing = requested.difference(&known).next().copied().unwrap_or(0);
            return Err(ServiceError::App(
                AppError::new(ErrorCode::TagShopMismatch).with_detail("tag_id", missing),
            ));
        }
    }

    let current: Vec<i32> =
        sqlx::query_scalar("SELECT tag_id FROM product_tags WHERE product_id = $1")
            .bind(product_id)
            .fetch_all(&mut *tx)
            .await?;
    let current: HashSet<i32> = current.into_iter().collect();

    let to_add: Vec<i32> = requested.difference(&current).copied().collect();
    let to_remove: Vec<i32> = current.difference(&requested).copied().collect();

    if !to_remove.is_empty() {
        sqlx::query("DELETE FROM product_tags WHERE product_id = $1 AND tag_id = ANY($2)")
            .bind(product_id)
            .bind(&to_remove)
            .execute(&mut *tx)
            .await?;
    }
    for tag_id in &to_add {
        sqlx::query("INSERT INTO product_tags (product_id, tag_id) VALUES ($1, $2)")
            .bind(product_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}
