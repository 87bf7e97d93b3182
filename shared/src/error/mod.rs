//! Unified error system for the delivery marketplace
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error type carrying a code and a client-safe message
//! - [`ErrorBody`]: JSON body of every error response
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 7xxx: Review errors
//! - 8xxx: Restaurant errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::OrderNotFound);
//! let err = AppError::validation("Invalid email format");
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, 2);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, ErrorBody};
