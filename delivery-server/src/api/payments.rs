//! Settlement at delivery

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Extension, Json, Router};
use shared::models::{Order, PaymentRequest};
use shared::order::PaymentMethod;

use super::ApiResult;
use crate::auth::Identity;
use crate::db::orders;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/payments", post(settle))
}

/// POST /payments
///
/// Open to the order's customer and its restaurant. Repeating the call with
/// the method already recorded returns the settled order unchanged.
pub async fn settle(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let Json(req) = payload?;
    let method = PaymentMethod::parse_required(req.payment_method.as_deref())?;

    let order = orders::settle_payment(&state.pool, req.order_id, method, &identity).await?;
    Ok(Json(order))
}
