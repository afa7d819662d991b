//! Background maintenance
//!
//! A daily sweep removes order history past the retention window and
//! offline products that no order ever referenced. Finality is read from
//! each shop's own status flow, so shops with custom flows keep the same
//! retention semantics.

use std::time::Duration;

use sqlx::PgPool;

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Orders in a final status are kept this long after creation.
const ORDER_RETENTION_DAYS: i32 = 90;

/// Offline products unreferenced by any order are kept this long after
/// their last update.
const PRODUCT_RETENTION_DAYS: i32 = 30;

/// Spawn the daily cleanup loop.
pub fn spawn_cleanup(pool: PgPool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = sweep(&pool).await {
                tracing::error!("Cleanup sweep failed: {e}");
            }
        }
    });
}

async fn sweep(pool: &PgPool) -> Result<(), sqlx::Error> {
    let orders = sqlx::query(
        r#"
        DELETE FROM orders o
        USING shops s, jsonb_array_elements(s.order_status_flow->'statuses') st
        WHERE o.shop_id = s.id
          AND (st->>'value')::int = o.status
          AND (st->>'is_final')::boolean
          AND o.created_at < NOW() - make_interval(days => $1)
        "#,
    )
    .bind(ORDER_RETENTION_DAYS)
    .execute(pool)
    .await?
    .rows_affected();

    let products = sqlx::query(
        r#"
        DELETE FROM products p
        WHERE p.status = 'offline'
          AND p.updated_at < NOW() - make_interval(days => $1)
          AND NOT EXISTS (SELECT 1 FROM order_items oi WHERE oi.product_id = p.id)
        "#,
    )
    .bind(PRODUCT_RETENTION_DAYS)
    .execute(pool)
    .await?
    .rows_affected();

    if orders > 0 || products > 0 {
        tracing::info!(orders, products, "Cleanup sweep removed expired rows");
    }
    Ok(())
}
