//! JWT identity for customers and restaurant operators

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::AccountKind;

use crate::state::AppState;

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: String,
    pub kind: AccountKind,
    /// Customer or restaurant ID, depending on `kind`
    pub profile_id: i64,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated caller, inserted into request extensions by [`auth_middleware`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub account_id: i64,
    pub kind: AccountKind,
    pub profile_id: i64,
}

impl Identity {
    /// Customer ID of the caller, or 403 for restaurant accounts
    pub fn customer_id(&self) -> Result<i64, AppError> {
        match self.kind {
            AccountKind::Customer => Ok(self.profile_id),
            AccountKind::Restaurant => Err(AppError::permission_denied(
                "Only customers can perform this action",
            )),
        }
    }

    /// Restaurant ID of the caller, or 403 for customer accounts
    pub fn restaurant_id(&self) -> Result<i64, AppError> {
        match self.kind {
            AccountKind::Restaurant => Ok(self.profile_id),
            AccountKind::Customer => Err(AppError::permission_denied(
                "Only restaurants can perform this action",
            )),
        }
    }

    /// Caller must be the restaurant named in the path; another restaurant
    /// gets 404 so foreign resources stay invisible
    pub fn require_restaurant(&self, path_id: i64) -> Result<i64, AppError> {
        let id = self.restaurant_id()?;
        if id != path_id {
            return Err(AppError::new(ErrorCode::RestaurantNotFound));
        }
        Ok(id)
    }

    /// Caller must be the customer named in the path
    pub fn require_customer(&self, path_id: i64) -> Result<i64, AppError> {
        let id = self.customer_id()?;
        if id != path_id {
            return Err(AppError::new(ErrorCode::CustomerNotFound));
        }
        Ok(id)
    }
}

pub const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a token for `identity`; returns the token and its expiry (Unix seconds)
pub fn create_token(
    identity: &Identity,
    secret: &str,
) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let exp = (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp();
    let claims = Claims {
        sub: identity.account_id.to_string(),
        kind: identity.kind,
        profile_id: identity.profile_id,
        exp: exp as usize,
        iat: now.timestamp() as usize,
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, exp))
}

/// Verify a token and recover the identity
pub fn verify_token(token: &str, secret: &str) -> Result<Identity, AppError> {
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    let account_id = token_data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::invalid_token("Invalid token subject"))?;

    Ok(Identity {
        account_id,
        kind: token_data.claims.kind,
        profile_id: token_data.claims.profile_id,
    })
}

/// Middleware that verifies the bearer token and inserts [`Identity`]
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::NotAuthenticated, "Missing Authorization header")
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::with_message(ErrorCode::TokenInvalid, "Invalid Authorization format")
    })?;

    let identity = verify_token(token, &state.jwt_secret)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn customer() -> Identity {
        Identity {
            account_id: 11,
            kind: AccountKind::Customer,
            profile_id: 22,
        }
    }

    #[test]
    fn token_roundtrip_preserves_identity() {
        let (token, exp) = create_token(&customer(), SECRET).unwrap();
        assert!(exp > chrono::Utc::now().timestamp());
        assert_eq!(verify_token(&token, SECRET).unwrap(), customer());
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let (token, _) = create_token(&customer(), SECRET).unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let past = chrono::Utc::now().timestamp() - 3600;
        let claims = Claims {
            sub: "11".into(),
            kind: AccountKind::Customer,
            profile_id: 22,
            exp: past as usize,
            iat: (past - 60) as usize,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(
            verify_token(&token, SECRET).unwrap_err().code,
            ErrorCode::TokenExpired
        );
    }

    #[test]
    fn role_and_path_checks() {
        let id = customer();
        assert_eq!(id.customer_id().unwrap(), 22);
        assert_eq!(
            id.restaurant_id().unwrap_err().code,
            ErrorCode::PermissionDenied
        );
        assert_eq!(id.require_customer(22).unwrap(), 22);
        assert_eq!(
            id.require_customer(23).unwrap_err().code,
            ErrorCode::CustomerNotFound
        );

        let restaurant = Identity {
            account_id: 1,
            kind: AccountKind::Restaurant,
            profile_id: 5,
        };
        assert_eq!(restaurant.require_restaurant(5).unwrap(), 5);
        assert_eq!(
            restaurant.require_restaurant(6).unwrap_err().code,
            ErrorCode::RestaurantNotFound
        );
    }
}
