//! HTTP API
//!
//! Storefront routes are public. Everything that acts on behalf of a customer
//! or a restaurant sits behind [`auth_middleware`], which puts an
//! [`Identity`](crate::auth::Identity) into the request extensions.

pub mod auth;
pub mod customers;
pub mod health;
pub mod orders;
pub mod panel;
pub mod payments;
pub mod restaurants;
pub mod reviews;

use axum::extract::DefaultBodyLimit;
use axum::{Json, Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::error::ServiceError;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, ServiceError>;

/// Build the application router with all middleware and state
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(restaurants::router());

    let protected = Router::new()
        .merge(orders::router())
        .merge(payments::router())
        .merge(reviews::router())
        .merge(panel::router())
        .merge(customers::router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            state.request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
