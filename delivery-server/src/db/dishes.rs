use shared::models::{Dish, LowStockDish};
use sqlx::SqlitePool;

use crate::error::ServiceResult;

pub async fn list_for_restaurant(pool: &SqlitePool, restaurant_id: i64) -> ServiceResult<Vec<Dish>> {
    let dishes = sqlx::query_as::<_, Dish>(
        "SELECT id, restaurant_id, name, description, price, stock, category_id \
         FROM dishes WHERE restaurant_id = ? ORDER BY category_id, name",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(dishes)
}

/// Dishes at or below `threshold`, lowest stock first
pub async fn low_stock(
    pool: &SqlitePool,
    restaurant_id: i64,
    threshold: i64,
) -> ServiceResult<Vec<LowStockDish>> {
    let dishes = sqlx::query_as::<_, LowStockDish>(
        "SELECT id, name, stock FROM dishes WHERE restaurant_id = ?1 AND stock <= ?2 ORDER BY stock, name",
    )
    .bind(restaurant_id)
    .bind(threshold)
    .fetch_all(pool)
    .await?;
    Ok(dishes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{self, memory_pool};

    #[tokio::test]
    async fn dishes_are_scoped_to_restaurant() {
        let pool = memory_pool().await;
        let (_, a) = test_support::restaurant(&pool, "a").await;
        let (_, b) = test_support::restaurant(&pool, "b").await;
        let dish = test_support::dish(&pool, a, 1500, 4).await;
        test_support::dish(&pool, b, 900, 4).await;

        let listed = list_for_restaurant(&pool, a).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, dish);
        assert_eq!(listed[0].price, 1500);
    }

    #[tokio::test]
    async fn low_stock_is_inclusive_and_ascending() {
        let pool = memory_pool().await;
        let (_, r) = test_support::restaurant(&pool, "a").await;
        let ten = test_support::dish(&pool, r, 100, 10).await;
        let two = test_support::dish(&pool, r, 100, 2).await;
        test_support::dish(&pool, r, 100, 11).await;

        let low: Vec<i64> = low_stock(&pool, r, 10).await.unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(low, vec![two, ten]);
    }
}
