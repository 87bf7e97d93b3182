//! Weekly business hours
//!
//! At most one window per weekday; the whole week is replaced at once.

use shared::models::BusinessHour;
use sqlx::{Sqlite, SqlitePool};
use std::collections::HashMap;

use crate::error::ServiceResult;

#[derive(sqlx::FromRow)]
struct HourRow {
    restaurant_id: i64,
    #[sqlx(flatten)]
    hour: BusinessHour,
}

pub async fn list_for<'e, E>(ex: E, restaurant_id: i64) -> ServiceResult<Vec<BusinessHour>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, BusinessHour>(
        "SELECT weekday, open_time, close_time FROM business_hours WHERE restaurant_id = ? ORDER BY weekday",
    )
    .bind(restaurant_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

/// Every restaurant's week, keyed by restaurant id
pub async fn list_all(pool: &SqlitePool) -> ServiceResult<HashMap<i64, Vec<BusinessHour>>> {
    let rows = sqlx::query_as::<_, HourRow>(
        "SELECT restaurant_id, weekday, open_time, close_time FROM business_hours ORDER BY restaurant_id, weekday",
    )
    .fetch_all(pool)
    .await?;

    let mut by_restaurant: HashMap<i64, Vec<BusinessHour>> = HashMap::new();
    for row in rows {
        by_restaurant.entry(row.restaurant_id).or_default().push(row.hour);
    }
    Ok(by_restaurant)
}

/// Replace the restaurant's week; days missing from `week` become closed
pub async fn replace_week(
    pool: &SqlitePool,
    restaurant_id: i64,
    week: &[BusinessHour],
) -> ServiceResult<Vec<BusinessHour>> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM business_hours WHERE restaurant_id = ?")
        .bind(restaurant_id)
        .execute(&mut *tx)
        .await?;

    for hour in week {
        sqlx::query(
            "INSERT INTO business_hours (restaurant_id, weekday, open_time, close_time) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(restaurant_id)
        .bind(hour.weekday)
        .bind(hour.open_time)
        .bind(hour.close_time)
        .execute(&mut *tx)
        .await?;
    }

    let stored = list_for(&mut *tx, restaurant_id).await?;
    tx.commit().await?;

    tracing::info!(restaurant_id, windows = stored.len(), "Business hours replaced");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{self, memory_pool};
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn overnight_window_survives_storage() {
        let pool = memory_pool().await;
        let (_, restaurant_id) = test_support::restaurant(&pool, "cantina").await;

        let week = vec![
            BusinessHour::from_clock(1, t(18, 0), t(2, 0)).unwrap(),
            BusinessHour::from_clock(3, t(11, 30), t(15, 0)).unwrap(),
        ];
        let stored = replace_week(&pool, restaurant_id, &week).await.unwrap();
        assert_eq!(stored, week);
        assert!(stored[0].is_overnight());
        assert!(!stored[1].is_overnight());
    }

    #[tokio::test]
    async fn replacing_drops_previous_days() {
        let pool = memory_pool().await;
        let (_, restaurant_id) = test_support::restaurant(&pool, "cantina").await;

        let first = vec![
            BusinessHour::from_clock(1, t(9, 0), t(17, 0)).unwrap(),
            BusinessHour::from_clock(2, t(9, 0), t(17, 0)).unwrap(),
        ];
        replace_week(&pool, restaurant_id, &first).await.unwrap();

        let second = vec![BusinessHour::from_clock(5, t(19, 0), t(23, 0)).unwrap()];
        replace_week(&pool, restaurant_id, &second).await.unwrap();

        let stored = list_for(&pool, restaurant_id).await.unwrap();
        assert_eq!(stored, second);
    }

    #[tokio::test]
    async fn list_all_groups_by_restaurant() {
        let pool = memory_pool().await;
        let (_, a) = test_support::restaurant(&pool, "a").await;
        let (_, b) = test_support::restaurant(&pool, "b").await;

        replace_week(&pool, a, &[BusinessHour::from_clock(0, t(10, 0), t(14, 0)).unwrap()])
            .await
            .unwrap();

        let all = list_all(&pool).await.unwrap();
        assert_eq!(all.get(&a).map(Vec::len), Some(1));
        assert!(!all.contains_key(&b));
    }
}
