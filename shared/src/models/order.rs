//! Order models
//!
//! Orders carry an immutable snapshot of the catalog data they were priced
//! against. Product and option references are weak: the referent may be
//! deleted later without touching historical orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Id, Price};

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: Id,
    pub shop_id: Id,
    pub user_id: Id,
    pub total_price: Price,
    /// Numeric value from the shop's order status flow
    pub status: i32,
    pub remark: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Line item with its product snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: Id,
    pub order_id: Id,
    /// Weak reference; the product may no longer exist
    pub product_id: Id,
    pub quantity: i32,
    /// Unit price at order creation
    pub price: Price,
    /// round2((price + sum of option adjustments) * quantity)
    pub total_price: Price,
    pub product_name: String,
    pub product_description: String,
    pub product_image_url: String,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub options: Vec<OrderItemOption>,
}

/// Selected option with its snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItemOption {
    pub id: Id,
    pub order_item_id: Id,
    pub category_id: Id,
    pub option_id: Id,
    pub option_name: String,
    pub category_name: String,
    pub price_adjustment: Price,
}

/// One row of the append-only status journal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderStatusLog {
    pub id: Id,
    pub order_id: Id,
    /// None for the creation entry
    pub old_status: Option<i32>,
    pub new_status: i32,
    pub changed_at: DateTime<Utc>,
}

/// Create order payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    pub user_id: Id,
    #[serde(default)]
    pub remark: String,
    pub items: Vec<OrderItemCreate>,
}

/// One requested line item
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemCreate {
    pub product_id: Id,
    pub quantity: i32,
    /// Selected option ids across all of the product's categories
    #[serde(default)]
    pub option_ids: Vec<Id>,
}

/// Update order payload; only the remark is mutable after creation
#[derive(Debug, Clone, Deserialize)]
pub struct OrderUpdate {
    pub remark: Option<String>,
}

/// Request a status transition
#[derive(Debug, Clone, Deserialize)]
pub struct OrderTransition {
    pub next_status: i32,
}

/// Order search parameters. Query strings carry `statuses` as a
/// comma-separated list, e.g. `statuses=1,2,-1`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub user_id: Option<Id>,
    #[serde(default, deserialize_with = "comma_separated_i32")]
    pub statuses: Option<Vec<i32>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

fn comma_separated_i32<'de, D>(deserializer: D) -> Result<Option<Vec<i32>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<i32>().map_err(serde::de::Error::custom))
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_query_statuses_from_comma_separated_string() {
        let query: OrderQuery =
            serde_json::from_str(r#"{"statuses":"1, 2,-1"}"#).unwrap();
        assert_eq!(query.statuses, Some(vec![1, 2, -1]));

        let query: OrderQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.statuses, None);

        let query: OrderQuery = serde_json::from_str(r#"{"statuses":""}"#).unwrap();
        assert_eq!(query.statuses, Some(vec![]));

        assert!(serde_json::from_str::<OrderQuery>(r#"{"statuses":"1,x"}"#).is_err());
    }
}
