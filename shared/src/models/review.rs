//! Reviews

use serde::{Deserialize, Serialize};

pub const MAX_SCORE: i64 = 5;

/// Review row, at most one per order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Review {
    pub id: i64,
    pub order_id: i64,
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub score: i64,
    pub comment: Option<String>,
    pub created_at: i64,
}

/// Review submission; customer and restaurant are derived server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub order_id: i64,
    pub score: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Recent review shown on the restaurant dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReviewSummary {
    pub order_id: i64,
    pub customer_name: String,
    pub score: i64,
    pub comment: Option<String>,
    pub created_at: i64,
}
