//! Order database operations
//!
//! Order creation is a single transaction: the catalog read, the pricing
//! pass, the order row, its item snapshots, the stock reservation, and the
//! first status log entry either all land against one consistent catalog
//! state or none do. Status transitions lock the order row so concurrent
//! transitions serialize on the database.

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};
use shared::models::flow::OrderStatusFlow;
use shared::models::order::{
    Order, OrderItem, OrderItemCreate, OrderItemOption, OrderQuery, OrderStatusLog,
};
use shared::types::Id;
use shared::util::IdGenerator;
use sqlx::{PgConnection, PgPool};

use crate::error::{ServiceError, ServiceResult};
use crate::pricing;

const ORDER_COLUMNS: &str =
    "id, shop_id, user_id, total_price, status, remark, created_at, updated_at";

/// Build and persist an order: load the catalog, validate and price the
/// selection, write the order row and snapshots, reserve stock, and append
/// the initial status log entry, all in one transaction.
pub async fn create_order(
    pool: &PgPool,
    ids: &IdGenerator,
    shop_id: Id,
    user_id: Id,
    remark: String,
    requested: &[OrderItemCreate],
    flow: &OrderStatusFlow,
) -> ServiceResult<Order> {
    let initial_status = flow.initial_status().map_err(ServiceError::App)?.value;
    let now = chrono::Utc::now();

    let mut tx = pool.begin().await?;

    // Pricing reads the catalog on this transaction, so the snapshot and
    // the stock reservation see the same catalog state
    let mut product_ids: Vec<Id> = requested.iter().map(|i| i.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let products =
        super::products::get_products_for_order(&mut tx, shop_id, &product_ids).await?;
    let priced = pricing::build_order(&products, requested)?;

    let order_id = ids.generate();
    sqlx::query(
        r#"
        INSERT INTO orders (id, shop_id, user_id, total_price, status, remark,
                            created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(order_id)
    .bind(shop_id)
    .bind(user_id)
    .bind(priced.total_price)
    .bind(initial_status)
    .bind(&remark)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let mut items = Vec::with_capacity(priced.items.len());
    for item in &priced.items {
        let item_id = ids.generate();
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_id, quantity, price,
                                     total_price, product_name, product_description,
                                     product_image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item_id)
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.total_price)
        .bind(&item.product_name)
        .bind(&item.product_description)
        .bind(&item.product_image_url)
        .execute(&mut *tx)
        .await?;

        let mut options = Vec::with_capacity(item.options.len());
        for opt in &item.options {
            let option_row_id = ids.generate();
            sqlx::query(
                r#"
                INSERT INTO order_item_options
                    (id, order_item_id, category_id, option_id, option_name,
                     category_name, price_adjustment)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(option_row_id)
            .bind(item_id)
            .bind(opt.category_id)
            .bind(opt.option_id)
            .bind(&opt.option_name)
            .bind(&opt.category_name)
            .bind(opt.price_adjustment)
            .execute(&mut *tx)
            .await?;

            options.push(OrderItemOption {
                id: option_row_id,
                order_item_id: item_id,
                category_id: opt.category_id,
                option_id: opt.option_id,
                option_name: opt.option_name.clone(),
                category_name: opt.category_name.clone(),
                price_adjustment: opt.price_adjustment,
            });
        }

        items.push(OrderItem {
            id: item_id,
            order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            total_price: item.total_price,
            product_name: item.product_name.clone(),
            product_description: item.product_description.clone(),
            product_image_url: item.product_image_url.clone(),
            options,
        });
    }

    // One guarded decrement per product, quantities aggregated across items
    let mut quantities: HashMap<Id, i32> = HashMap::new();
    for item in &priced.items {
        *quantities.entry(item.product_id).or_insert(0) += item.quantity;
    }
    for (product_id, quantity) in &quantities {
        super::products::decrease_stock(&mut tx, shop_id, *product_id, *quantity).await?;
    }

    insert_status_log(&mut tx, ids, order_id, None, initial_status, now).await?;

    tx.commit().await?;

    Ok(Order {
        id: order_id,
        shop_id,
        user_id,
        total_price: priced.total_price,
        status: initial_status,
        remark,
        created_at: now,
        updated_at: now,
        items,
    })
}

/// Load an order with its item snapshots, tenant-scoped.
pub async fn get_order(pool: &PgPool, shop_id: Id, id: Id) -> ServiceResult<Order> {
    let order: Option<Order> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND shop_id = $2"
    ))
    .bind(id)
    .bind(shop_id)
    .fetch_optional(pool)
    .await?;
    let mut order =
        order.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::OrderNotFound)))?;

    order.items = load_items(pool, &[order.id]).await?;
    Ok(order)
}

async fn load_items(pool: &PgPool, order_ids: &[Id]) -> ServiceResult<Vec<OrderItem>> {
    let ids: Vec<i64> = order_ids.iter().map(|id| id.as_i64()).collect();

    let mut items: Vec<OrderItem> = sqlx::query_as(
        "SELECT id, order_id, product_id, quantity, price, total_price, product_name, \
         product_description, product_image_url \
         FROM order_items WHERE order_id = ANY($1) ORDER BY id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    if items.is_empty() {
        return Ok(items);
    }

    let item_ids: Vec<i64> = items.iter().map(|i| i.id.as_i64()).collect();
    let options: Vec<OrderItemOption> = sqlx::query_as(
        "SELECT id, order_item_id, category_id, option_id, option_name, category_name, \
         price_adjustment \
         FROM order_item_options WHERE order_item_id = ANY($1) ORDER BY id",
    )
    .bind(&item_ids)
    .fetch_all(pool)
    .await?;

    for item in &mut items {
        item.options = options
            .iter()
            .filter(|o| o.order_item_id == item.id)
            .cloned()
            .collect();
    }
    Ok(items)
}

/// Paged order search with optional user, status, and time filters.
pub async fn list_orders(
    pool: &PgPool,
    shop_id: Id,
    query: &OrderQuery,
) -> ServiceResult<(Vec<Order>, i64)> {
    let (limit, offset) = super::page_bounds(query.page, query.page_size);
    let statuses = query
        .statuses
        .as_ref()
        .filter(|s| !s.is_empty())
        .cloned();

    let mut orders: Vec<Order> = sqlx::query_as(&format!(
        r#"
        SELECT {ORDER_COLUMNS} FROM orders
        WHERE shop_id = $1
          AND ($2::bigint IS NULL OR user_id = $2)
          AND ($3::int[] IS NULL OR status = ANY($3))
          AND ($4::timestamptz IS NULL OR created_at >= $4)
          AND ($5::timestamptz IS NULL OR created_at <= $5)
        ORDER BY id DESC
        LIMIT $6 OFFSET $7
        "#
    ))
    .bind(shop_id)
    .bind(query.user_id)
    .bind(&statuses)
    .bind(query.start_time)
    .bind(query.end_time)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM orders
        WHERE shop_id = $1
          AND ($2::bigint IS NULL OR user_id = $2)
          AND ($3::int[] IS NULL OR status = ANY($3))
          AND ($4::timestamptz IS NULL OR created_at >= $4)
          AND ($5::timestamptz IS NULL OR created_at <= $5)
        "#,
    )
    .bind(shop_id)
    .bind(query.user_id)
    .bind(&statuses)
    .bind(query.start_time)
    .bind(query.end_time)
    .fetch_one(pool)
    .await?;

    if !orders.is_empty() {
        let order_ids: Vec<Id> = orders.iter().map(|o| o.id).collect();
        let items = load_items(pool, &order_ids).await?;
        for order in &mut orders {
            order.items = items
                .iter()
                .filter(|i| i.order_id == order.id)
                .cloned()
                .collect();
        }
    }

    Ok((orders, total))
}

pub async fn update_remark(
    pool: &PgPool,
    shop_id: Id,
    id: Id,
    remark: Option<&str>,
) -> ServiceResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET remark = COALESCE($1, remark), updated_at = NOW() \
         WHERE id = $2 AND shop_id = $3",
    )
    .bind(remark)
    .bind(id)
    .bind(shop_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(ServiceError::App(AppError::new(ErrorCode::OrderNotFound)));
    }
    Ok(())
}

/// Move an order to `next` if the shop's flow allows it from the current
/// status. The row is locked for the duration of the check, so two
/// concurrent transitions cannot both succeed from the same state.
pub async fn transition_status(
    pool: &PgPool,
    ids: &IdGenerator,
    shop_id: Id,
    id: Id,
    next: i32,
    flow: &OrderStatusFlow,
) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;

    let current: Option<i32> = sqlx::query_scalar(
        "SELECT status FROM orders WHERE id = $1 AND shop_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(shop_id)
    .fetch_optional(&mut *tx)
    .await?;
    let current =
        current.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::OrderNotFound)))?;

    flow.check_transition(current, next).map_err(ServiceError::App)?;

    let now = chrono::Utc::now();
    sqlx::query(
        "UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 AND shop_id = $4",
    )
    .bind(next)
    .bind(now)
    .bind(id)
    .bind(shop_id)
    .execute(&mut *tx)
    .await?;

    insert_status_log(&mut tx, ids, id, Some(current), next, now).await?;

    tx.commit().await?;

    get_order(pool, shop_id, id).await
}

async fn insert_status_log(
    conn: &mut PgConnection,
    ids: &IdGenerator,
    order_id: Id,
    old_status: Option<i32>,
    new_status: i32,
    changed_at: chrono::DateTime<chrono::Utc>,
) -> ServiceResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_status_logs (id, order_id, old_status, new_status, changed_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(ids.generate())
    .bind(order_id)
    .bind(old_status)
    .bind(new_status)
    .bind(changed_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Status change history of an order, oldest first.
pub async fn list_status_logs(
    pool: &PgPool,
    shop_id: Id,
    order_id: Id,
) -> ServiceResult<Vec<OrderStatusLog>> {
    // Scope through the parent order so foreign shops see nothing
    let exists: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM orders WHERE id = $1 AND shop_id = $2")
            .bind(order_id)
            .bind(shop_id)
            .fetch_optional(pool)
            .await?;
    if exists.is_none() {
        return Err(ServiceError::App(AppError::new(ErrorCode::OrderNotFound)));
    }

    let logs = sqlx::query_as(
        "SELECT id, order_id, old_status, new_status, changed_at \
         FROM order_status_logs WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(logs)
}
