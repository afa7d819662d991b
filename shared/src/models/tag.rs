//! Tag model
//!
//! Tags use a small auto-increment id instead of a snowflake; they are
//! listed by humans and stay within a per-shop namespace.

use serde::{Deserialize, Serialize};

use crate::types::Id;

/// Per-shop tag; name unique within the shop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Tag {
    pub id: i32,
    pub shop_id: Id,
    pub name: String,
    pub description: String,
}

/// Create tag payload
#[derive(Debug, Clone, Deserialize)]
pub struct TagCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Update tag payload
#[derive(Debug, Clone, Deserialize)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Replace a product's tag set
#[derive(Debug, Clone, Deserialize)]
pub struct ProductTagsUpdate {
    pub tag_ids: Vec<i32>,
}
