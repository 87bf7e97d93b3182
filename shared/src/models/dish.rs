//! Dish catalog

use serde::{Deserialize, Serialize};

/// Dish row; price and stock are never negative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Dish {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Minor currency units
    pub price: i64,
    pub stock: i64,
    pub category_id: Option<i64>,
}
