//! Identifier and price primitives.
//!
//! `Id` is the 64-bit snowflake key used by every aggregate except tags.
//! On the wire it is a decimal string (64-bit values do not survive
//! JavaScript number parsing) but numeric input is accepted too.
//!
//! `Price` is a fixed-point decimal with two fractional digits. Every
//! arithmetic result is rounded to 0.01 on construction, so equality
//! comparisons never depend on accumulated float error. Values are signed:
//! option price adjustments may be negative; non-negativity of product
//! prices and totals is enforced at the validation sites that require it.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Id
// ============================================================================

/// Snowflake entity id. Zero encodes "not yet assigned".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Id(i64);

impl Id {
    /// The "unset" sentinel.
    pub const UNSET: Id = Id(0);

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn as_i64(self) -> i64 {
        self.0
    }

    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Id> for i64 {
    fn from(id: Id) -> Self {
        id.0
    }
}

/// Parse failure for [`Id`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid id: {0:?}")]
pub struct InvalidId(pub String);

impl FromStr for Id {
    type Err = InvalidId;

    /// Parses a decimal string. Fails on empty input, signs, and any
    /// non-digit character. `"0"` parses to the unset sentinel.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidId(s.to_string()));
        }
        s.parse::<i64>()
            .map(Id)
            .map_err(|_| InvalidId(s.to_string()))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string or integer id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Id, E> {
                v.parse().map_err(de::Error::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Id, E> {
                i64::try_from(v)
                    .map(Id)
                    .map_err(|_| de::Error::custom(format!("id out of range: {v}")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Id, E> {
                if v < 0 {
                    return Err(de::Error::custom(format!("negative id: {v}")));
                }
                Ok(Id(v))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

#[cfg(feature = "db")]
impl sqlx::Type<sqlx::Postgres> for Id {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "db")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Id {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Id(<i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "db")]
impl sqlx::Encode<'_, sqlx::Postgres> for Id {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

// ============================================================================
// Price
// ============================================================================

/// Fixed-point money value, rounded to two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Wrap a decimal, rounding to 0.01 (banker's rounding is avoided;
    /// midpoints round away from zero, matching display arithmetic).
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(
            2,
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        ))
    }

    /// Build from integer cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn add(self, other: Price) -> Price {
        Price::new(self.0 + other.0)
    }

    /// Multiply by a quantity, re-rounding the result.
    pub fn mul_quantity(self, quantity: i32) -> Price {
        Price::new(self.0 * Decimal::from(quantity))
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl fmt::Display for Price {
    /// Formats with exactly two decimals, e.g. `23.00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::ops::Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price::add(self, rhs)
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Price::add)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Price::new)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0.to_f64().unwrap_or(0.0))
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PriceVisitor;

        impl Visitor<'_> for PriceVisitor {
            type Value = Price;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or numeric string price")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
                Decimal::from_f64_retain(v)
                    .map(Price::new)
                    .ok_or_else(|| de::Error::custom(format!("price not representable: {v}")))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
                Ok(Price::new(Decimal::from(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
                Ok(Price::new(Decimal::from(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
                v.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(PriceVisitor)
    }
}

#[cfg(feature = "db")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "db")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Price::new(<Decimal as sqlx::Decode<sqlx::Postgres>>::decode(
            value,
        )?))
    }
}

#[cfg(feature = "db")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_parses_decimal_strings() {
        assert_eq!("123".parse::<Id>().unwrap(), Id::new(123));
        assert_eq!("0".parse::<Id>().unwrap(), Id::UNSET);
        assert!("".parse::<Id>().is_err());
        assert!("12a".parse::<Id>().is_err());
        assert!("-5".parse::<Id>().is_err());
        assert!("1.5".parse::<Id>().is_err());
    }

    #[test]
    fn id_serializes_as_string() {
        let json = serde_json::to_string(&Id::new(1234567890123456789)).unwrap();
        assert_eq!(json, "\"1234567890123456789\"");
    }

    #[test]
    fn id_deserializes_from_string_or_number() {
        let from_str: Id = serde_json::from_str("\"42\"").unwrap();
        let from_num: Id = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, from_num);
        assert!(serde_json::from_str::<Id>("\"x42\"").is_err());
        assert!(serde_json::from_str::<Id>("-1").is_err());
    }

    #[test]
    fn price_rounds_to_two_decimals() {
        let p: Price = "10.005".parse().unwrap();
        assert_eq!(p, Price::from_cents(1001));
        let q: Price = "10.004".parse().unwrap();
        assert_eq!(q, Price::from_cents(1000));
    }

    #[test]
    fn price_arithmetic() {
        let unit = Price::from_cents(1000);
        let adj = Price::from_cents(150);
        assert_eq!(unit.add(adj).mul_quantity(2), Price::from_cents(2300));
        assert_eq!(Price::from_cents(-150).add(unit), Price::from_cents(850));
    }

    #[test]
    fn price_sum() {
        let total: Price = [Price::from_cents(100), Price::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(350));
    }

    #[test]
    fn price_predicates() {
        assert!(Price::ZERO.is_zero());
        assert!(Price::from_cents(1).is_positive());
        assert!(Price::from_cents(-1).is_negative());
        assert!(!Price::from_cents(-1).is_positive());
    }

    #[test]
    fn price_display_uses_two_decimals() {
        assert_eq!(Price::from_cents(2300).to_string(), "23.00");
        assert_eq!(Price::from_cents(150).to_string(), "1.50");
        assert_eq!(Price::ZERO.to_string(), "0.00");
    }

    #[test]
    fn price_deserializes_from_number_or_string() {
        let cases = ["10.5", "\"10.5\"", "\"10.50\""];
        for case in cases {
            let p: Price = serde_json::from_str(case).unwrap();
            assert_eq!(p, Price::from_cents(1050), "case {case}");
        }
        let int: Price = serde_json::from_str("7").unwrap();
        assert_eq!(int, Price::from_cents(700));
    }

    #[test]
    fn price_serializes_as_number() {
        let json = serde_json::to_string(&Price::from_cents(1050)).unwrap();
        assert_eq!(json, "10.5");
    }
}
