//! Shared types for the delivery marketplace
//!
//! Domain rules that do not need storage live here: the cart aggregate,
//! the order status machine, payment methods, the delivery fee and the
//! business-hours availability evaluator. The server crate layers
//! persistence and HTTP on top.

pub mod availability;
pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};
