//! Product catalog database operations

use shared::error::{AppError, ErrorCode};
use shared::models::product::{
    Product, ProductCreate, ProductOption, ProductOptionCategory, ProductQuery, ProductStatus,
    ProductUpdate,
};
use shared::types::Id;
use shared::util::IdGenerator;
use sqlx::{PgConnection, PgPool};

use crate::error::{ServiceError, ServiceResult};

const PRODUCT_COLUMNS: &str =
    "id, shop_id, name, description, price, stock, image_url, status, created_at, updated_at";

/// Insert a product with its option graph in one transaction.
///
/// Text fields must already be sanitized; price and stock already validated.
pub async fn insert_product(
    pool: &PgPool,
    ids: &IdGenerator,
    shop_id: Id,
    data: &ProductCreate,
) -> ServiceResult<Product> {
    let mut tx = pool.begin().await?;
    let now = chrono::Utc::now();

    let product_id = ids.generate();
    sqlx::query(
        r#"
        INSERT INTO products (id, shop_id, name, description, price, stock, image_url,
                              status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(product_id)
    .bind(shop_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.stock)
    .bind(&data.image_url)
    .bind(ProductStatus::Pending)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let mut categories = Vec::with_capacity(data.option_categories.len());
    for cat in &data.option_categories {
        let category_id = ids.generate();
        sqlx::query(
            r#"
            INSERT INTO product_option_categories
                (id, product_id, name, is_required, is_multiple, display_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(category_id)
        .bind(product_id)
        .bind(&cat.name)
        .bind(cat.is_required)
        .bind(cat.is_multiple)
        .bind(cat.display_order)
        .execute(&mut *tx)
        .await?;

        let mut options = Vec::with_capacity(cat.options.len());
        for opt in &cat.options {
            let option_id = ids.generate();
            sqlx::query(
                r#"
                INSERT INTO product_options
                    (id, category_id, name, price_adjustment, display_order, is_default)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(option_id)
            .bind(category_id)
            .bind(&opt.name)
            .bind(opt.price_adjustment)
            .bind(opt.display_order)
            .bind(opt.is_default)
            .execute(&mut *tx)
            .await?;

            options.push(ProductOption {
                id: option_id,
                category_id,
                name: opt.name.clone(),
                price_adjustment: opt.price_adjustment,
                display_order: opt.display_order,
                is_default: opt.is_default,
            });
        }

        categories.push(ProductOptionCategory {
            id: category_id,
            product_id,
            name: cat.name.clone(),
            is_required: cat.is_required,
            is_multiple: cat.is_multiple,
            display_order: cat.display_order,
            options,
        });
    }

    tx.commit().await?;

    Ok(Product {
        id: product_id,
        shop_id,
        name: data.name.clone(),
        description: data.description.clone(),
        price: data.price,
        stock: data.stock,
        image_url: data.image_url.clone(),
        status: ProductStatus::Pending,
        created_at: now,
        updated_at: now,
        option_categories: categories,
    })
}

/// Load a product with its full option graph, tenant-scoped.
pub async fn get_product(pool: &PgPool, shop_id: Id, id: Id) -> ServiceResult<Product> {
    let product: Option<Product> = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND shop_id = $2"
    ))
    .bind(id)
    .bind(shop_id)
    .fetch_optional(pool)
    .await?;
    let mut product =
        product.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::ProductNotFound)))?;

    product.option_categories = load_option_graph(pool, &[product.id]).await?;
    Ok(product)
}

/// Load several products with their option graphs (order creation path).
pub async fn get_products_for_order(
    conn: &mut PgConnection,
    shop_id: Id,
    product_ids: &[Id],
) -> ServiceResult<Vec<Product>> {
    let ids: Vec<i64> = product_ids.iter().map(|id| id.as_i64()).collect();
    let mut products: Vec<Product> = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE shop_id = $1 AND id = ANY($2)"
    ))
    .bind(shop_id)
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    if products.is_empty() {
        return Ok(products);
    }

    let loaded: Vec<Id> = products.iter().map(|p| p.id).collect();
    let categories = load_option_graph_conn(conn, &loaded).await?;
    for product in &mut products {
        product.option_categories = categories
            .iter()
            .filter(|c| c.product_id == product.id)
            .cloned()
            .collect();
    }
    Ok(products)
}

async fn load_option_graph(
    pool: &PgPool,
    product_ids: &[Id],
) -> ServiceResult<Vec<ProductOptionCategory>> {
    let mut conn = pool.acquire().await?;
    load_option_graph_conn(&mut conn, product_ids).await
}

async fn load_option_graph_conn(
    conn: &mut PgConnection,
    product_ids: &[Id],
) -> ServiceResult<Vec<ProductOptionCategory>> {
    let ids: Vec<i64> = product_ids.iter().map(|id| id.as_i64()).collect();

    let mut categories: Vec<ProductOptionCategory> = sqlx::query_as(
        "SELECT id, product_id, name, is_required, is_multiple, display_order \
         FROM product_option_categories WHERE product_id = ANY($1) \
         ORDER BY display_order, id",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    if categories.is_empty() {
        return Ok(categories);
    }

    let category_ids: Vec<i64> = categories.iter().map(|c| c.id.as_i64()).collect();
    let options: Vec<ProductOption> = sqlx::query_as(
        "SELECT id, category_id, name, price_adjustment, display_order, is_default \
         FROM product_options WHERE category_id = ANY($1) \
         ORDER BY display_order, id",
    )
    .bind(&category_ids)
    .fetch_all(&mut *conn)
    .await?;

    for category in &mut categories {
        category.options = options
            .iter()
            .filter(|o| o.category_id == category.id)
            .cloned()
            .collect();
    }
    Ok(categories)
}

pub async fn list_products(
    pool: &PgPool,
    shop_id: Id,
    query: &ProductQuery,
) -> ServiceResult<(Vec<Product>, i64)> {
    let (limit, offset) = super::page_bounds(query.page, query.page_size);
    let search = query
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")));

    let products: Vec<Product> = sqlx::query_as(&format!(
        r#"
        SELECT {PRODUCT_COLUMNS} FROM products
        WHERE shop_id = $1
          AND ($2::text IS NULL OR name ILIKE $2)
          AND (NOT $3 OR status <> 'offline')
        ORDER BY id DESC
        LIMIT $4 OFFSET $5
        "#
    ))
    .bind(shop_id)
    .bind(&search)
    .bind(query.exclude_offline)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM products
        WHERE shop_id = $1
          AND ($2::text IS NULL OR name ILIKE $2)
          AND (NOT $3 OR status <> 'offline')
        "#,
    )
    .bind(shop_id)
    .bind(&search)
    .bind(query.exclude_offline)
    .fetch_one(pool)
    .await?;

    Ok((products, total))
}

/// Partial update of mutable fields. Status is not touched here; it routes
/// through [`set_status`].
pub async fn update_product(
    pool: &PgPool,
    shop_id: Id,
    id: Id,
    data: &ProductUpdate,
) -> ServiceResult<()> {
    let rows = sqlx::query(
        r#"
        UPDATE products SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            price = COALESCE($3, price),
            stock = COALESCE($4, stock),
            image_url = COALESCE($5, image_url),
            updated_at = NOW()
        WHERE id = $6 AND shop_id = $7
        "#,
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.stock)
    .bind(&data.image_url)
    .bind(id)
    .bind(shop_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(ServiceError::App(AppError::new(ErrorCode::ProductNotFound)));
    }
    Ok(())
}

/// Apply a validated status transition. The update is optimistic on the
/// current status so concurrent transitions cannot double-apply.
pub async fn set_status(
    pool: &PgPool,
    shop_id: Id,
    id: Id,
    current: ProductStatus,
    next: ProductStatus,
) -> ServiceResult<()> {
    current.transition(next).map_err(ServiceError::App)?;

    let rows = sqlx::query(
        "UPDATE products SET status = $1, updated_at = NOW() \
         WHERE id = $2 AND shop_id = $3 AND status = $4",
    )
    .bind(next)
    .bind(id)
    .bind(shop_id)
    .bind(current)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        // Row gone or status moved underneath us; reload to tell which
        let status: Option<ProductStatus> =
            sqlx::query_scalar("SELECT status FROM products WHERE id = $1 AND shop_id = $2")
                .bind(id)
                .bind(shop_id)
                .fetch_optional(pool)
                .await?;
        return match status {
            None => Err(ServiceError::App(AppError::new(ErrorCode::ProductNotFound))),
            Some(actual) => Err(ServiceError::App(
                AppError::new(ErrorCode::InvalidTransition)
                    .with_detail("from", actual.as_str())
                    .with_detail("to", next.as_str()),
            )),
        };
    }
    Ok(())
}

/// Delete a product unless order history references it.
pub async fn delete_product(pool: &PgPool, shop_id: Id, id: Id) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    let referenced: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM order_items WHERE product_id = $1 LIMIT 1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    if referenced.is_some() {
        return Err(ServiceError::App(
            AppError::new(ErrorCode::ReferencedByOrder).with_detail("product_id", id.to_string()),
        ));
    }

    sqlx::query("DELETE FROM product_tags WHERE product_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let rows = sqlx::query("DELETE FROM products WHERE id = $1 AND shop_id = $2")
        .bind(id)
        .bind(shop_id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(ServiceError::App(AppError::new(ErrorCode::ProductNotFound)));
    }

    tx.commit().await?;
    Ok(())
}

/// Atomically reserve stock. The guard in the predicate makes the decrement
/// a compare-and-swap; zero affected rows means not enough stock (or a
/// vanished product, same failure for the caller).
pub async fn decrease_stock(
    conn: &mut PgConnection,
    shop_id: Id,
    product_id: Id,
    quantity: i32,
) -> ServiceResult<()> {
    let rows = sqlx::query(
        "UPDATE products SET stock = stock - $1, updated_at = NOW() \
         WHERE id = $2 AND shop_id = $3 AND stock >= $1",
    )
    .bind(quantity)
    .bind(product_id)
    .bind(shop_id)
    .execute(conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(ServiceError::App(
            AppError::new(ErrorCode::InsufficientStock)
                .with_detail("product_id", product_id.to_string()),
        ));
    }
    Ok(())
}
