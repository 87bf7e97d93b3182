//! Reviews, at most one per completed order
//!
//! The unique index on `reviews.order_id` decides duplicates. There is no
//! existence read before the insert.

use shared::error::{AppError, ErrorCode};
use shared::models::{CreateReviewRequest, MAX_SCORE, Review, ReviewSummary};
use shared::order::OrderStatus;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use super::orders;
use crate::error::{ServiceError, ServiceResult};

pub fn validate_score(score: i64) -> Result<(), AppError> {
    if !(0..=MAX_SCORE).contains(&score) {
        return Err(AppError::with_message(
            ErrorCode::ReviewScoreOutOfRange,
            format!("Score must be between 0 and {MAX_SCORE}, got {score}"),
        ));
    }
    Ok(())
}

/// Store a review by `customer_id`; the restaurant comes from the order
pub async fn create(
    pool: &SqlitePool,
    customer_id: i64,
    req: &CreateReviewRequest,
) -> ServiceResult<Review> {
    validate_score(req.score)?;

    let order = orders::find_by_id(pool, req.order_id)
        .await?
        .filter(|o| o.customer_id == customer_id)
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    if order.status != OrderStatus::Complete {
        return Err(AppError::new(ErrorCode::OrderNotComplete).into());
    }

    let review = Review {
        id: snowflake_id(),
        order_id: order.id,
        customer_id,
        restaurant_id: order.restaurant_id,
        score: req.score,
        comment: req
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from),
        created_at: now_millis(),
    };

    sqlx::query(
        "INSERT INTO reviews (id, order_id, customer_id, restaurant_id, score, comment, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(review.id)
    .bind(review.order_id)
    .bind(review.customer_id)
    .bind(review.restaurant_id)
    .bind(review.score)
    .bind(review.comment.as_deref())
    .bind(review.created_at)
    .execute(pool)
    .await
    .map_err(|e| {
        ServiceError::unique_as(e, &["reviews.order_id"], ErrorCode::ReviewAlreadyExists)
    })?;

    tracing::info!(order_id = review.order_id, score = review.score, "Review stored");
    Ok(review)
}

/// Latest reviews of a restaurant with the reviewer's name
pub async fn recent_for_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
    limit: i64,
) -> ServiceResult<Vec<ReviewSummary>> {
    let reviews = sqlx::query_as::<_, ReviewSummary>(
        "SELECT rv.order_id, c.name AS customer_name, rv.score, rv.comment, rv.created_at \
         FROM reviews rv JOIN customers c ON c.id = rv.customer_id \
         WHERE rv.restaurant_id = ?1 ORDER BY rv.created_at DESC, rv.id DESC LIMIT ?2",
    )
    .bind(restaurant_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;
    use crate::db::test_support;
    use shared::models::AccountKind;
    use shared::order::{CreateOrderRequest, DeliveryFeePolicy, OrderLine, PaymentMethod};

    async fn completed_order(pool: &SqlitePool) -> (i64, i64, i64) {
        let (_, restaurant_id) = test_support::restaurant(pool, "cantina").await;
        let (_, customer_id) = test_support::customer(pool, "ana").await;
        let dish_id = test_support::dish(pool, restaurant_id, 1200, 10).await;
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
        let order = orders::create(pool, &req, &DeliveryFeePolicy::default())
            .await
            .unwrap()
            .order;
        let who = Identity {
            account_id: 0,
            kind: AccountKind::Customer,
            profile_id: customer_id,
        };
        orders::settle_payment(pool, order.id, PaymentMethod::Pix, &who)
            .await
            .unwrap();
        (order.id, customer_id, restaurant_id)
    }

    fn review(order_id: i64, score: i64) -> CreateReviewRequest {
        CreateReviewRequest {
            order_id,
            score,
            comment: Some("  Muito bom  ".into()),
        }
    }

    fn code(err: ServiceError) -> ErrorCode {
        AppError::from(err).code
    }

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(validate_score(0).is_ok());
        assert!(validate_score(5).is_ok());
        assert_eq!(validate_score(6).unwrap_err().code, ErrorCode::ReviewScoreOutOfRange);
        assert_eq!(validate_score(-1).unwrap_err().code, ErrorCode::ReviewScoreOutOfRange);
    }

    #[tokio::test]
    async fn second_review_conflicts() {
        let pool = test_support::memory_pool().await;
        let (order_id, customer_id, restaurant_id) = completed_order(&pool).await;

        let stored = create(&pool, customer_id, &review(order_id, 5)).await.unwrap();
        assert_eq!(stored.restaurant_id, restaurant_id);
        assert_eq!(stored.comment.as_deref(), Some("Muito bom"));

        let err = create(&pool, customer_id, &review(order_id, 3)).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ReviewAlreadyExists);

        let recent = recent_for_restaurant(&pool, restaurant_id, 5).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].score, 5);
        assert_eq!(recent[0].customer_name, "Customer ana");
    }

    #[tokio::test]
    async fn incomplete_or_foreign_orders_are_rejected() {
        let pool = test_support::memory_pool().await;
        let (_, restaurant_id) = test_support::restaurant(&pool, "cantina").await;
        let (_, customer_id) = test_support::customer(&pool, "ana").await;
        let (_, other_customer) = test_support::customer(&pool, "bia").await;
        let dish_id = test_support::dish(&pool, restaurant_id, 1200, 10).await;
        let req = CreateOrderRequest {
            restaurant_id,
            customer_id,
            payment_method: PaymentMethod::Cash,
            items: vec![OrderLine {
                dish_id,
                quantity: 1,
                note: None,
            }],
        };
        let order = orders::create(&pool, &req, &DeliveryFeePolicy::default())
            .await
            .unwrap()
            .order;

        let err = create(&pool, customer_id, &review(order.id, 4)).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::OrderNotComplete);

        let err = create(&pool, other_customer, &review(order.id, 4)).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::OrderNotFound);

        let err = create(&pool, customer_id, &review(order.id, 9)).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ReviewScoreOutOfRange);
    }

    #[tokio::test]
    async fn concurrent_submissions_store_exactly_one_review() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("reviews.db").display());
        let pool = crate::db::connect(&url).await.unwrap();
        let (order_id, customer_id, _) = completed_order(&pool).await;

        let mut handles = Vec::new();
        for score in 0..8 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                create(&pool, customer_id, &review(order_id, score % 6)).await
            }));
        }

        let mut stored = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => stored += 1,
                Err(err) => {
                    assert_eq!(code(err), ErrorCode::ReviewAlreadyExists);
                    conflicts += 1;
                }
            }
        }
        assert_eq!(stored, 1);
        assert_eq!(conflicts, 7);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE order_id = ?")
            .bind(order_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }
}
