//! Unified error codes for the shop ordering backend
//!
//! Error codes are shared between the server and its clients and are
//! organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Shop errors
//! - 4xxx: Order errors
//! - 6xxx: Product / catalog errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2002,

    // ==================== 3xxx: Shop ====================
    /// Shop not found
    ShopNotFound = 3001,
    /// Shop validity period has expired
    ShopExpired = 3002,
    /// Shop owner username already exists
    OwnerUsernameExists = 3003,
    /// Order status flow configuration is invalid
    InvalidStatusFlow = 3004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderEmpty = 4002,
    /// Requested status transition is not allowed
    InvalidTransition = 4003,
    /// Order is already in a final status
    TerminalState = 4004,
    /// Status value is not part of the shop's flow
    StatusNotInFlow = 4005,

    // ==================== 6xxx: Product / Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product is not online
    ProductNotOnline = 6002,
    /// Not enough stock to satisfy the order
    InsufficientStock = 6003,
    /// Product is referenced by existing orders
    ReferencedByOrder = 6004,
    /// Option category not found
    OptionCategoryNotFound = 6101,
    /// Required option category has no selection
    RequiredCategoryUnsatisfied = 6102,
    /// Multiple options selected in a single-choice category
    MultipleChoiceNotAllowed = 6103,
    /// Option not found
    OptionNotFound = 6201,
    /// Tag not found
    TagNotFound = 6401,
    /// Tag name already exists in this shop
    TagNameExists = 6402,
    /// Tag belongs to a different shop
    TagShopMismatch = 6403,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// User username already exists in this shop
    UserUsernameExists = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Caller is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Shop
            ErrorCode::ShopNotFound => "Shop not found",
            ErrorCode::ShopExpired => "Shop validity period has expired",
            ErrorCode::OwnerUsernameExists => "Shop owner username already exists",
            ErrorCode::InvalidStatusFlow => "Order status flow configuration is invalid",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::InvalidTransition => "Status transition is not allowed",
            ErrorCode::TerminalState => "Order is already in a final status",
            ErrorCode::StatusNotInFlow => "Status value is not part of the shop's flow",

            // Product / Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductNotOnline => "Product is not online",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::ReferencedByOrder => "Product is referenced by existing orders",
            ErrorCode::OptionCategoryNotFound => "Option category not found",
            ErrorCode::RequiredCategoryUnsatisfied => {
                "Required option category has no selection"
            }
            ErrorCode::MultipleChoiceNotAllowed => {
                "Multiple options selected in a single-choice category"
            }
            ErrorCode::OptionNotFound => "Option not found",
            ErrorCode::TagNotFound => "Tag not found",
            ErrorCode::TagNameExists => "Tag name already exists",
            ErrorCode::TagShopMismatch => "Tag belongs to a different shop",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UserUsernameExists => "Username already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::AdminRequired),

            // Shop
            3001 => Ok(ErrorCode::ShopNotFound),
            3002 => Ok(ErrorCode::ShopExpired),
            3003 => Ok(ErrorCode::OwnerUsernameExists),
            3004 => Ok(ErrorCode::InvalidStatusFlow),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),
            4003 => Ok(ErrorCode::InvalidTransition),
            4004 => Ok(ErrorCode::TerminalState),
            4005 => Ok(ErrorCode::StatusNotInFlow),

            // Product / Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductNotOnline),
            6003 => Ok(ErrorCode::InsufficientStock),
            6004 => Ok(ErrorCode::ReferencedByOrder),
            6101 => Ok(ErrorCode::OptionCategoryNotFound),
            6102 => Ok(ErrorCode::RequiredCategoryUnsatisfied),
            6103 => Ok(ErrorCode::MultipleChoiceNotAllowed),
            6201 => Ok(ErrorCode::OptionNotFound),
            6401 => Ok(ErrorCode::TagNotFound),
            6402 => Ok(ErrorCode::TagNameExists),
            6403 => Ok(ErrorCode::TagShopMismatch),

            // User
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UserUsernameExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        // General
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::Unknown.code(), 1);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::AlreadyExists.code(), 4);
        assert_eq!(ErrorCode::InvalidRequest.code(), 5);
        assert_eq!(ErrorCode::InvalidFormat.code(), 6);
        assert_eq!(ErrorCode::RequiredField.code(), 7);
        assert_eq!(ErrorCode::ValueOutOfRange.code(), 8);

        // Auth
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::TokenExpired.code(), 1003);
        assert_eq!(ErrorCode::TokenInvalid.code(), 1004);

        // Permission
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::AdminRequired.code(), 2002);

        // Shop
        assert_eq!(ErrorCode::ShopNotFound.code(), 3001);
        assert_eq!(ErrorCode::ShopExpired.code(), 3002);
        assert_eq!(ErrorCode::OwnerUsernameExists.code(), 3003);
        assert_eq!(ErrorCode::InvalidStatusFlow.code(), 3004);

        // Order
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::OrderEmpty.code(), 4002);
        assert_eq!(ErrorCode::InvalidTransition.code(), 4003);
        assert_eq!(ErrorCode::TerminalState.code(), 4004);
        assert_eq!(ErrorCode::StatusNotInFlow.code(), 4005);

        // Product / Catalog
        assert_eq!(ErrorCode::ProductNotFound.code(), 6001);
        assert_eq!(ErrorCode::ProductNotOnline.code(), 6002);
        assert_eq!(ErrorCode::InsufficientStock.code(), 6003);
        assert_eq!(ErrorCode::ReferencedByOrder.code(), 6004);
        assert_eq!(ErrorCode::OptionCategoryNotFound.code(), 6101);
        assert_eq!(ErrorCode::RequiredCategoryUnsatisfied.code(), 6102);
        assert_eq!(ErrorCode::MultipleChoiceNotAllowed.code(), 6103);
        assert_eq!(ErrorCode::OptionNotFound.code(), 6201);
        assert_eq!(ErrorCode::TagNotFound.code(), 6401);
        assert_eq!(ErrorCode::TagNameExists.code(), 6402);
        assert_eq!(ErrorCode::TagShopMismatch.code(), 6403);

        // User
        assert_eq!(ErrorCode::UserNotFound.code(), 8001);
        assert_eq!(ErrorCode::UserUsernameExists.code(), 8002);

        // System
        assert_eq!(ErrorCode::InternalError.code(), 9001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
        assert_eq!(ErrorCode::ConfigError.code(), 9005);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::NotFound.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1001), Ok(ErrorCode::NotAuthenticated));
        assert_eq!(ErrorCode::try_from(3002), Ok(ErrorCode::ShopExpired));
        assert_eq!(ErrorCode::try_from(4001), Ok(ErrorCode::OrderNotFound));
        assert_eq!(ErrorCode::try_from(6003), Ok(ErrorCode::InsufficientStock));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(5001), Err(InvalidErrorCode(5001)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::NotFound).unwrap();
        assert_eq!(json, "3");

        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");

        let json = serde_json::to_string(&ErrorCode::Success).unwrap();
        assert_eq!(json, "0");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("0").unwrap();
        assert_eq!(code, ErrorCode::Success);

        let code: ErrorCode = serde_json::from_str("4003").unwrap();
        assert_eq!(code, ErrorCode::InvalidTransition);

        let code: ErrorCode = serde_json::from_str("9001").unwrap();
        assert_eq!(code, ErrorCode::InternalError);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::NotFound), "3");
        assert_eq!(format!("{}", ErrorCode::OrderNotFound), "4001");
        assert_eq!(format!("{}", ErrorCode::InternalError), "9001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(ErrorCode::OrderNotFound.message(), "Order not found");
        assert_eq!(ErrorCode::InsufficientStock.message(), "Insufficient stock");
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }

    #[test]
    fn test_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::NotAuthenticated,
            ErrorCode::PermissionDenied,
            ErrorCode::ShopExpired,
            ErrorCode::OrderNotFound,
            ErrorCode::RequiredCategoryUnsatisfied,
            ErrorCode::InternalError,
        ];

        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let parsed: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, parsed);
        }
    }
}
