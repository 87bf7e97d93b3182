//! Data models
//!
//! Row types derive `sqlx::FromRow` when the `db` feature is enabled.

pub mod account;
pub mod dashboard;
pub mod dish;
pub mod order;
pub mod restaurant;
pub mod review;

pub use account::*;
pub use dashboard::*;
pub use dish::*;
pub use order::*;
pub use restaurant::*;
pub use review::*;
