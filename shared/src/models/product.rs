//! Product catalog models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::types::{Id, Price};

/// Product lifecycle status.
///
/// New products start in `Pending`. Allowed transitions: pending -> online,
/// online -> offline, offline -> online. There is no way back to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Pending,
    Online,
    Offline,
}

impl ProductStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }

    pub fn can_transition(self, next: ProductStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Online)
                | (Self::Online, Self::Offline)
                | (Self::Offline, Self::Online)
        )
    }

    /// Validate a requested transition, failing with `InvalidTransition`.
    pub fn transition(self, next: ProductStatus) -> AppResult<ProductStatus> {
        if self.can_transition(next) {
            Ok(next)
        } else {
            Err(AppError::new(ErrorCode::InvalidTransition)
                .with_detail("from", self.as_str())
                .with_detail("to", next.as_str()))
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            other => Err(AppError::with_message(
                ErrorCode::InvalidFormat,
                format!("Unknown product status: {other}"),
            )),
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Stored as TEXT; delegated impls keep the runtime query API simple.
#[cfg(feature = "db")]
impl sqlx::Type<sqlx::Postgres> for ProductStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "db")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ProductStatus {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        text.parse().map_err(Into::into)
    }
}

#[cfg(feature = "db")]
impl sqlx::Encode<'_, sqlx::Postgres> for ProductStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: Id,
    pub shop_id: Id,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i32,
    pub image_url: String,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Option categories, ordered by display_order (loaded separately)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub option_categories: Vec<ProductOptionCategory>,
}

/// Option category under a product, e.g. "Size" or "Sweetness"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductOptionCategory {
    pub id: Id,
    pub product_id: Id,
    pub name: String,
    pub is_required: bool,
    pub is_multiple: bool,
    pub display_order: i32,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub options: Vec<ProductOption>,
}

/// One selectable option within a category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductOption {
    pub id: Id,
    pub category_id: Id,
    pub name: String,
    /// Signed: options may raise or reduce the unit price
    pub price_adjustment: Price,
    pub display_order: i32,
    pub is_default: bool,
}

/// Create product payload
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: Price,
    pub stock: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub option_categories: Vec<OptionCategoryCreate>,
}

/// Create option category payload (nested under product creation)
#[derive(Debug, Clone, Deserialize)]
pub struct OptionCategoryCreate {
    pub name: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_multiple: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub options: Vec<OptionCreate>,
}

/// Create option payload
#[derive(Debug, Clone, Deserialize)]
pub struct OptionCreate {
    pub name: String,
    #[serde(default)]
    pub price_adjustment: Price,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub is_default: bool,
}

/// Update product payload (partial; status routes through the transition check)
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
    pub status: Option<ProductStatus>,
}

/// Product list query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    #[serde(default)]
    pub exclude_offline: bool,
}
