//! Customer profile and order history

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use shared::error::{AppError, ErrorCode};
use shared::models::{CustomerOrder, CustomerProfile, CustomerProfileUpdate};

use super::ApiResult;
use crate::auth::Identity;
use crate::db::{accounts, orders};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers/{id}", get(get_customer))
        .route("/customers/{id}/profile", put(update_profile))
        .route("/customers/{id}/orders", get(list_orders))
}

/// GET /customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<CustomerProfile> {
    let customer_id = identity.require_customer(id)?;
    let profile = accounts::find_customer_profile(&state.pool, customer_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;
    Ok(Json(profile))
}

/// PUT /customers/{id}/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    payload: Result<Json<CustomerProfileUpdate>, JsonRejection>,
) -> ApiResult<CustomerProfile> {
    let customer_id = identity.require_customer(id)?;
    let Json(upd) = payload?;

    Ok(Json(accounts::update_customer_profile(&state.pool, customer_id, &upd).await?))
}

/// GET /customers/{id}/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<CustomerOrder>> {
    let customer_id = identity.require_customer(id)?;
    Ok(Json(orders::list_for_customer(&state.pool, customer_id).await?))
}
