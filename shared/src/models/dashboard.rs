//! Restaurant dashboard

use serde::{Deserialize, Serialize};

use super::review::ReviewSummary;

/// Open orders grouped by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub awaiting_acceptance: i64,
    pub preparing: i64,
    pub en_route: i64,
}

/// Orders and revenue for the current business day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub orders_today: i64,
    /// Sum of totals of today's complete orders, minor units
    pub revenue_today: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LowStockDish {
    pub id: i64,
    pub name: String,
    pub stock: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub restaurant_id: i64,
    pub status_counts: StatusCounts,
    pub today: DailyMetrics,
    pub low_stock: Vec<LowStockDish>,
    pub recent_reviews: Vec<ReviewSummary>,
}
