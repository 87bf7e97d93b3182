//! Unified error codes for the delivery marketplace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog (dish) errors
//! - 7xxx: Review errors
//! - 8xxx: Restaurant errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare u16 so clients can switch on it without string parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
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

    // ==================== 3xxx: Account ====================
    /// Username or email already taken
    AccountAlreadyExists = 3002,
    /// Cuisine type does not exist
    CuisineTypeNotFound = 3003,
    /// Customer profile not found
    CustomerNotFound = 3004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderEmpty = 4002,
    /// Unknown order status value
    OrderInvalidStatus = 4003,
    /// Status change not allowed by the transition table
    OrderInvalidTransition = 4004,
    /// Order is not complete yet
    OrderNotComplete = 4005,
    /// Order was modified by another request
    OrderConcurrentUpdate = 4006,
    /// Cart already bound to another restaurant
    CartRestaurantConflict = 4007,
    /// Order item quantity must be at least one
    OrderItemInvalidQuantity = 4008,

    // ==================== 5xxx: Payment ====================
    /// Unknown payment method
    PaymentInvalidMethod = 5001,
    /// No payment method chosen
    PaymentMethodRequired = 5002,
    /// Order was already settled with another method
    OrderAlreadyPaid = 5003,

    // ==================== 6xxx: Catalog ====================
    /// Dish does not belong to the order's restaurant
    DishNotInRestaurant = 6001,
    /// Not enough stock for the requested quantity
    DishOutOfStock = 6002,

    // ==================== 7xxx: Review ====================
    /// Order already reviewed
    ReviewAlreadyExists = 7001,
    /// Score outside 0..=5
    ReviewScoreOutOfRange = 7002,

    // ==================== 8xxx: Restaurant ====================
    /// Restaurant not found
    RestaurantNotFound = 8001,
    /// Business hours payload is invalid
    InvalidBusinessHours = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Account
            ErrorCode::AccountAlreadyExists => "Username or email already in use",
            ErrorCode::CuisineTypeNotFound => "Cuisine type not found",
            ErrorCode::CustomerNotFound => "Customer not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::OrderInvalidStatus => "Invalid order status",
            ErrorCode::OrderInvalidTransition => "Order status transition not allowed",
            ErrorCode::OrderNotComplete => "Order is not complete",
            ErrorCode::OrderConcurrentUpdate => "Order was modified by another request",
            ErrorCode::CartRestaurantConflict => "Cart contains dishes from another restaurant",
            ErrorCode::OrderItemInvalidQuantity => "Item quantity must be at least 1",

            // Payment
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::PaymentMethodRequired => "Payment method is required",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",

            // Catalog
            ErrorCode::DishNotInRestaurant => "Dish does not belong to this restaurant",
            ErrorCode::DishOutOfStock => "Dish is out of stock",

            // Review
            ErrorCode::ReviewAlreadyExists => "Order has already been reviewed",
            ErrorCode::ReviewScoreOutOfRange => "Score must be between 0 and 5",

            // Restaurant
            ErrorCode::RestaurantNotFound => "Restaurant not found",
            ErrorCode::InvalidBusinessHours => "Invalid business hours",

            // System
            ErrorCode::InternalError => "Internal server error",
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
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Account
            3002 => Ok(ErrorCode::AccountAlreadyExists),
            3003 => Ok(ErrorCode::CuisineTypeNotFound),
            3004 => Ok(ErrorCode::CustomerNotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),
            4003 => Ok(ErrorCode::OrderInvalidStatus),
            4004 => Ok(ErrorCode::OrderInvalidTransition),
            4005 => Ok(ErrorCode::OrderNotComplete),
            4006 => Ok(ErrorCode::OrderConcurrentUpdate),
            4007 => Ok(ErrorCode::CartRestaurantConflict),
            4008 => Ok(ErrorCode::OrderItemInvalidQuantity),

            // Payment
            5001 => Ok(ErrorCode::PaymentInvalidMethod),
            5002 => Ok(ErrorCode::PaymentMethodRequired),
            5003 => Ok(ErrorCode::OrderAlreadyPaid),

            // Catalog
            6001 => Ok(ErrorCode::DishNotInRestaurant),
            6002 => Ok(ErrorCode::DishOutOfStock),

            // Review
            7001 => Ok(ErrorCode::ReviewAlreadyExists),
            7002 => Ok(ErrorCode::ReviewScoreOutOfRange),

            // Restaurant
            8001 => Ok(ErrorCode::RestaurantNotFound),
            8002 => Ok(ErrorCode::InvalidBusinessHours),

            // System
            9001 => Ok(ErrorCode::InternalError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
