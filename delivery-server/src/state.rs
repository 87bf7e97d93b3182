//! Application state shared by all handlers

use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;
use shared::order::{DeliveryFeePolicy, StatusPolicy};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// HS256 secret for identity tokens
    pub jwt_secret: String,
    pub business_timezone: Tz,
    pub status_policy: StatusPolicy,
    pub delivery_fee: DeliveryFeePolicy,
    pub low_stock_threshold: i64,
    pub request_timeout: Duration,
}

impl AppState {
    /// Open the database, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = db::connect(&config.database_url).await?;
        Ok(Self::with_pool(pool, config))
    }

    pub fn with_pool(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            business_timezone: config.business_timezone,
            status_policy: config.status_policy,
            delivery_fee: config.delivery_fee,
            low_stock_threshold: config.low_stock_threshold,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Current instant in the business time zone
    pub fn local_now(&self) -> DateTime<Tz> {
        crate::time::now_in(self.business_timezone)
    }
}
