use std::collections::HashMap;

use shared::models::{CuisineType, Restaurant};
use sqlx::{Sqlite, SqlitePool};

use crate::error::ServiceResult;

// Email lives on the owning account
macro_rules! restaurant_select {
    ($tail:literal) => {
        concat!(
            "SELECT r.id, r.account_id, r.name, r.address, r.phone, a.email, r.created_at ",
            "FROM restaurants r JOIN accounts a ON a.id = r.account_id ",
            $tail
        )
    };
}

pub async fn list(pool: &SqlitePool) -> ServiceResult<Vec<Restaurant>> {
    let rows = sqlx::query_as::<_, Restaurant>(restaurant_select!("ORDER BY r.name"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id<'e, E>(ex: E, restaurant_id: i64) -> ServiceResult<Option<Restaurant>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, Restaurant>(restaurant_select!("WHERE r.id = ?"))
        .bind(restaurant_id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn exists(pool: &SqlitePool, restaurant_id: i64) -> ServiceResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM restaurants WHERE id = ?")
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn cuisine_types_for(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> ServiceResult<Vec<CuisineType>> {
    let rows = sqlx::query_as::<_, CuisineType>(
        "SELECT c.id, c.description FROM cuisine_types c \
         JOIN restaurant_cuisine_types rc ON rc.cuisine_type_id = c.id \
         WHERE rc.restaurant_id = ? ORDER BY c.id",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[derive(sqlx::FromRow)]
struct CuisineRow {
    restaurant_id: i64,
    #[sqlx(flatten)]
    cuisine: CuisineType,
}

/// Cuisine types of every restaurant, keyed by restaurant id
pub async fn cuisine_types_all(pool: &SqlitePool) -> ServiceResult<HashMap<i64, Vec<CuisineType>>> {
    let rows = sqlx::query_as::<_, CuisineRow>(
        "SELECT rc.restaurant_id, c.id, c.description FROM cuisine_types c \
         JOIN restaurant_cuisine_types rc ON rc.cuisine_type_id = c.id \
         ORDER BY rc.restaurant_id, c.id",
    )
    .fetch_all(pool)
    .await?;

    let mut by_restaurant: HashMap<i64, Vec<CuisineType>> = HashMap::new();
    for row in rows {
        by_restaurant.entry(row.restaurant_id).or_default().push(row.cuisine);
    }
    Ok(by_restaurant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{self, memory_pool};

    #[tokio::test]
    async fn restaurant_rows_carry_account_email() {
        let pool = memory_pool().await;
        let (account_id, restaurant_id) = test_support::restaurant(&pool, "cantina").await;

        let restaurant = find_by_id(&pool, restaurant_id).await.unwrap().unwrap();
        assert_eq!(restaurant.account_id, account_id);
        assert_eq!(restaurant.email, "cantina@example.com");

        assert!(exists(&pool, restaurant_id).await.unwrap());
        assert!(!exists(&pool, restaurant_id + 1).await.unwrap());
        assert!(find_by_id(&pool, restaurant_id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let pool = memory_pool().await;
        test_support::restaurant(&pool, "zeta").await;
        test_support::restaurant(&pool, "alfa").await;

        let names: Vec<String> = list(&pool).await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Restaurant alfa", "Restaurant zeta"]);
    }

    #[tokio::test]
    async fn cuisine_types_follow_registration() {
        let pool = memory_pool().await;
        let (_, restaurant_id) = test_support::restaurant(&pool, "cantina").await;

        let cuisines = cuisine_types_for(&pool, restaurant_id).await.unwrap();
        assert_eq!(cuisines.len(), 1);
        assert_eq!(cuisines[0].description, "Brasileira");

        let all = cuisine_types_all(&pool).await.unwrap();
        assert_eq!(all.get(&restaurant_id).map(Vec::len), Some(1));
    }
}
