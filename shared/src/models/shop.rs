//! Shop (tenant root) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::flow::OrderStatusFlow;
use crate::types::Id;
use crate::util::now_millis;

/// Shop entity. Every other aggregate hangs off a shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Shop {
    pub id: Id,
    pub name: String,
    /// Unique across all shops
    pub owner_username: String,
    /// bcrypt hash, never exposed in responses
    #[serde(skip_serializing)]
    pub owner_password: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub address: String,
    pub image_url: String,
    pub description: String,
    /// Soft expiry: reads succeed past this point, writes are rejected
    pub valid_until: DateTime<Utc>,
    /// Free-form settings blob
    pub settings: Value,
    /// Configurable order state machine (JSON column)
    #[cfg_attr(feature = "db", sqlx(json))]
    pub order_status_flow: OrderStatusFlow,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    /// Whether the shop's validity period has passed.
    pub fn is_expired(&self) -> bool {
        now_millis() > self.valid_until.timestamp_millis()
    }
}

/// Create shop payload (admin only)
#[derive(Debug, Clone, Deserialize)]
pub struct ShopCreate {
    pub name: String,
    pub owner_username: String,
    /// Plaintext or pre-hashed; hashed before persistence either way
    pub owner_password: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    pub valid_until: DateTime<Utc>,
    pub settings: Option<Value>,
    /// Defaults to the standard pending/accepted/... flow when omitted
    pub order_status_flow: Option<OrderStatusFlow>,
}

/// Update shop payload (partial)
#[derive(Debug, Clone, Deserialize)]
pub struct ShopUpdate {
    pub name: Option<String>,
    pub owner_password: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub settings: Option<Value>,
    pub order_status_flow: Option<OrderStatusFlow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn shop(valid_until: DateTime<Utc>) -> Shop {
        Shop {
            id: Id::new(100),
            name: "Tea House".to_string(),
            owner_username: "owner".to_string(),
            owner_password: "$2a$10$hash".to_string(),
            contact_phone: String::new(),
            contact_email: String::new(),
            address: String::new(),
            image_url: String::new(),
            description: String::new(),
            valid_until,
            settings: Value::Null,
            order_status_flow: OrderStatusFlow::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn expiry_check() {
        assert!(!shop(Utc::now() + Duration::days(30)).is_expired());
        assert!(shop(Utc::now() - Duration::seconds(5)).is_expired());
    }

    #[test]
    fn password_is_not_serialized() {
        let json = serde_json::to_string(&shop(Utc::now())).unwrap();
        assert!(!json.contains("owner_password"));
        assert!(!json.contains("$2a$"));
    }
}
