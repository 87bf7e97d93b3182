//! Order creation from a checked-out cart

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Extension, Json, Router};
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderDetail;
use shared::order::CreateOrderRequest;

use crate::auth::Identity;
use crate::db::orders;
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/orders", post(create_order))
}

/// POST /orders
///
/// The customer in the body must be the caller. Orders are accepted whether
/// or not the restaurant is open right now.
pub async fn create_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderDetail>), ServiceError> {
    let customer_id = identity.customer_id()?;
    let Json(req) = payload?;
    if req.customer_id != customer_id {
        return Err(AppError::new(ErrorCode::CustomerNotFound).into());
    }

    let detail = orders::create(&state.pool, &req, &state.delivery_fee).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}
