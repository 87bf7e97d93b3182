//! Registration and login

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use shared::models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use super::ApiResult;
use crate::auth::{Identity, create_token};
use crate::db::accounts;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::{hash_password, verify_password};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ServiceError> {
    let Json(req) = payload?;
    accounts::validate_registration(&req)?;

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;
    let res = accounts::register(&state.pool, &req, &password_hash).await?;

    Ok((StatusCode::CREATED, Json(res)))
}

/// POST /auth/login
///
/// `username` may also be the account email.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(req) = payload?;

    let creds = accounts::find_credentials(&state.pool, &req.username)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;
    if !verify_password(&req.password, &creds.password_hash) {
        return Err(AppError::invalid_credentials().into());
    }

    let profile_id = accounts::profile_id(&state.pool, creds.account_id, creds.kind)
        .await?
        .ok_or_else(|| {
            tracing::error!(account_id = creds.account_id, "Account has no profile row");
            AppError::new(ErrorCode::InternalError)
        })?;

    let identity = Identity {
        account_id: creds.account_id,
        kind: creds.kind,
        profile_id,
    };
    let (token, expires_at) = create_token(&identity, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    tracing::info!(account_id = identity.account_id, kind = ?identity.kind, "Login succeeded");
    Ok(Json(LoginResponse {
        token,
        account_id: identity.account_id,
        kind: identity.kind,
        profile_id,
        expires_at,
    }))
}
