//! Public storefront: restaurant listing, detail, availability and dishes

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use shared::availability;
use shared::error::{AppError, ErrorCode};
use shared::models::{Availability, Dish, RestaurantView};

use super::ApiResult;
use crate::db::{business_hours, dishes, restaurants};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/{id}", get(get_restaurant))
        .route("/restaurants/{id}/availability", get(get_availability))
        .route("/restaurants/{id}/dishes", get(list_dishes))
}

fn restaurant_not_found() -> AppError {
    AppError::new(ErrorCode::RestaurantNotFound)
}

/// GET /restaurants
pub async fn list_restaurants(State(state): State<AppState>) -> ApiResult<Vec<RestaurantView>> {
    let now = state.local_now();
    let mut hours = business_hours::list_all(&state.pool).await?;
    let mut cuisines = restaurants::cuisine_types_all(&state.pool).await?;

    let views = restaurants::list(&state.pool)
        .await?
        .into_iter()
        .map(|restaurant| {
            let hours = hours.remove(&restaurant.id).unwrap_or_default();
            RestaurantView {
                is_open: availability::is_open_at(&hours, &now),
                cuisine_types: cuisines.remove(&restaurant.id).unwrap_or_default(),
                hours,
                restaurant,
            }
        })
        .collect();
    Ok(Json(views))
}

/// GET /restaurants/{id}
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<RestaurantView> {
    let restaurant = restaurants::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(restaurant_not_found)?;
    let hours = business_hours::list_for(&state.pool, id).await?;
    let cuisine_types = restaurants::cuisine_types_for(&state.pool, id).await?;

    Ok(Json(RestaurantView {
        is_open: availability::is_open_at(&hours, &state.local_now()),
        restaurant,
        cuisine_types,
        hours,
    }))
}

/// GET /restaurants/{id}/availability
pub async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Availability> {
    if !restaurants::exists(&state.pool, id).await? {
        return Err(restaurant_not_found().into());
    }
    let hours = business_hours::list_for(&state.pool, id).await?;

    Ok(Json(Availability {
        restaurant_id: id,
        is_open: availability::is_open_at(&hours, &state.local_now()),
    }))
}

/// GET /restaurants/{id}/dishes
pub async fn list_dishes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Dish>> {
    if !restaurants::exists(&state.pool, id).await? {
        return Err(restaurant_not_found().into());
    }
    Ok(Json(dishes::list_for_restaurant(&state.pool, id).await?))
}
