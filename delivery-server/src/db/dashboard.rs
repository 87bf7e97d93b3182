//! Restaurant dashboard aggregates

use shared::models::{DailyMetrics, Dashboard, StatusCounts};
use shared::order::OrderStatus;
use sqlx::SqlitePool;

use super::{dishes, reviews};
use crate::error::ServiceResult;

const RECENT_REVIEWS: i64 = 5;

async fn status_counts(pool: &SqlitePool, restaurant_id: i64) -> ServiceResult<StatusCounts> {
    let rows: Vec<(OrderStatus, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM orders WHERE restaurant_id = ? AND status != 'complete' GROUP BY status",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;

    let mut counts = StatusCounts::default();
    for (status, count) in rows {
        match status {
            OrderStatus::AwaitingAcceptance => counts.awaiting_acceptance = count,
            OrderStatus::Preparing => counts.preparing = count,
            OrderStatus::EnRoute => counts.en_route = count,
            OrderStatus::Complete => {}
        }
    }
    Ok(counts)
}

/// Orders placed in `[day_start, day_end)` and revenue of the complete ones
async fn daily_metrics(
    pool: &SqlitePool,
    restaurant_id: i64,
    day_start: i64,
    day_end: i64,
) -> ServiceResult<DailyMetrics> {
    let (orders_today, revenue_today): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'complete' THEN total ELSE 0 END), 0) \
         FROM orders WHERE restaurant_id = ?1 AND created_at >= ?2 AND created_at < ?3",
    )
    .bind(restaurant_id)
    .bind(day_start)
    .bind(day_end)
    .fetch_one(pool)
    .await?;

    Ok(DailyMetrics {
        orders_today,
        revenue_today,
    })
}

/// Load the dashboard for the business day `[day_start, day_end)` (Unix millis)
pub async fn load(
    pool: &SqlitePool,
    restaurant_id: i64,
    day_start: i64,
    day_end: i64,
    low_stock_threshold: i64,
) -> ServiceResult<Dashboard> {
    Ok(Dashboard {
        restaurant_id,
        status_counts: status_counts(pool, restaurant_id).await?,
        today: daily_metrics(pool, restaurant_id, day_start, day_end).await?,
        low_stock: dishes::low_stock(pool, restaurant_id, low_stock_threshold).await?,
        recent_reviews: reviews::recent_for_restaurant(pool, restaurant_id, RECENT_REVIEWS)
            .await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;
    use crate::db::{orders, test_support};
    use shared::models::AccountKind;
    use shared::order::{CreateOrderRequest, DeliveryFeePolicy, OrderLine, PaymentMethod, StatusPolicy};

    #[tokio::test]
    async fn dashboard_aggregates_today() {
        let pool = test_support::memory_pool().await;
        let (_, restaurant_id) = test_support::restaurant(&pool, "cantina").await;
        let (_, customer_id) = test_support::customer(&pool, "ana").await;
        let dish_id = test_support::dish(&pool, restaurant_id, 1000, 12).await;

        let req = CreateOrderRequest {
            restaurant_id,
            customer_id,
            payment_method: PaymentMethod::Pix,
            items: vec![OrderLine {
                dish_id,
                quantity: 1,
                note: None,
            }],
        };
        let policy = DeliveryFeePolicy::default();
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(orders::create(&pool, &req, &policy).await.unwrap().order.id);
        }

        orders::update_status(&pool, StatusPolicy::Strict, restaurant_id, ids[1], OrderStatus::Preparing)
            .await
            .unwrap();
        let who = Identity {
            account_id: 0,
            kind: AccountKind::Customer,
            profile_id: customer_id,
        };
        orders::settle_payment(&pool, ids[2], PaymentMethod::Cash, &who)
            .await
            .unwrap();

        let now = shared::util::now_millis();
        let day_ms = 24 * 60 * 60 * 1000;
        let dash = load(&pool, restaurant_id, now - day_ms, now + day_ms, 10)
            .await
            .unwrap();

        assert_eq!(
            dash.status_counts,
            StatusCounts {
                awaiting_acceptance: 1,
                preparing: 1,
                en_route: 0
            }
        );
        assert_eq!(dash.today.orders_today, 3);
        assert_eq!(dash.today.revenue_today, 1500);
        // 12 - 3 = 9 units left
        assert_eq!(dash.low_stock.len(), 1);
        assert_eq!(dash.low_stock[0].stock, 9);
        assert!(dash.recent_reviews.is_empty());

        // A window that ended yesterday sees nothing
        let past = load(&pool, restaurant_id, now - 2 * day_ms, now - day_ms, 10)
            .await
            .unwrap();
        assert_eq!(past.today, DailyMetrics::default());
    }
}
