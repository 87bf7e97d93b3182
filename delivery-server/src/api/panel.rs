//! Restaurant operator panel
//!
//! Every route is scoped to the restaurant in the path, which must be the
//! caller's own.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use shared::availability;
use shared::models::{
    BusinessHour, BusinessHourInput, Dashboard, Order, Restaurant, RestaurantOrder,
    RestaurantProfileUpdate, UpdateStatusRequest,
};
use shared::order::OrderStatus;

use super::ApiResult;
use crate::auth::Identity;
use crate::db::{accounts, business_hours, dashboard, orders};
use crate::state::AppState;
use crate::time::day_bounds_millis;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants/{id}/orders", get(list_orders))
        .route("/restaurants/{id}/orders/{order_id}/status", put(update_order_status))
        .route("/restaurants/{id}/dashboard", get(get_dashboard))
        .route("/restaurants/{id}/hours", put(replace_hours))
        .route("/restaurants/{id}/profile", put(update_profile))
}

/// GET /restaurants/{id}/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<RestaurantOrder>> {
    let restaurant_id = identity.require_restaurant(id)?;
    Ok(Json(orders::list_for_restaurant(&state.pool, restaurant_id).await?))
}

/// PUT /restaurants/{id}/orders/{order_id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((id, order_id)): Path<(i64, i64)>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let restaurant_id = identity.require_restaurant(id)?;
    let Json(req) = payload?;
    let status: OrderStatus = req.status.parse()?;

    let order =
        orders::update_status(&state.pool, state.status_policy, restaurant_id, order_id, status)
            .await?;
    Ok(Json(order))
}

/// GET /restaurants/{id}/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<Dashboard> {
    let restaurant_id = identity.require_restaurant(id)?;
    let (day_start, day_end) = day_bounds_millis(&state.local_now());

    let dash = dashboard::load(
        &state.pool,
        restaurant_id,
        day_start,
        day_end,
        state.low_stock_threshold,
    )
    .await?;
    Ok(Json(dash))
}

/// PUT /restaurants/{id}/hours
///
/// Replaces the whole week; weekdays left out are closed.
pub async fn replace_hours(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    payload: Result<Json<Vec<BusinessHourInput>>, JsonRejection>,
) -> ApiResult<Vec<BusinessHour>> {
    let restaurant_id = identity.require_restaurant(id)?;
    let Json(inputs) = payload?;
    let week = availability::parse_week(&inputs)?;

    Ok(Json(business_hours::replace_week(&state.pool, restaurant_id, &week).await?))
}

/// PUT /restaurants/{id}/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    payload: Result<Json<RestaurantProfileUpdate>, JsonRejection>,
) -> ApiResult<Restaurant> {
    let restaurant_id = identity.require_restaurant(id)?;
    let Json(upd) = payload?;

    Ok(Json(accounts::update_restaurant_profile(&state.pool, restaurant_id, &upd).await?))
}
