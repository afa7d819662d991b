//! User (customer) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Id;

/// Customer account belonging to one shop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: Id,
    pub shop_id: Id,
    /// Unique within the shop
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub nickname: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create user payload
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub phone: String,
}

/// Update user payload
#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    pub password: Option<String>,
    pub nickname: Option<String>,
    pub phone: Option<String>,
}
