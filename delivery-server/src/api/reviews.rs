//! Review submission

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Extension, Json, Router};
use http::StatusCode;
use shared::models::{CreateReviewRequest, Review};

use crate::auth::Identity;
use crate::db::reviews;
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/reviews", post(create_review))
}

/// POST /reviews
pub async fn create_review(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Review>), ServiceError> {
    let customer_id = identity.customer_id()?;
    let Json(req) = payload?;

    let review = reviews::create(&state.pool, customer_id, &req).await?;
    Ok((StatusCode::CREATED, Json(review)))
}
