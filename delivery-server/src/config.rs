//! Server configuration

use chrono_tz::Tz;
use shared::order::{DeliveryFeePolicy, StatusPolicy};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for identity tokens
    pub jwt_secret: String,
    /// Zone used for "now" in availability and for the dashboard's business day
    pub business_timezone: Tz,
    pub status_policy: StatusPolicy,
    pub delivery_fee: DeliveryFeePolicy,
    /// Dishes at or below this stock show up on the dashboard
    pub low_stock_threshold: i64,
    pub request_timeout_secs: u64,
    /// Emit logs as JSON (LOG_FORMAT=json)
    pub json_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:delivery.db".into(),
            http_port: 3001,
            environment: "development".into(),
            jwt_secret: "dev-JWT_SECRET-not-for-production".into(),
            business_timezone: chrono_tz::America::Sao_Paulo,
            status_policy: StatusPolicy::default(),
            delivery_fee: DeliveryFeePolicy::default(),
            low_stock_threshold: 10,
            request_timeout_secs: 30,
            json_logs: false,
        }
    }
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T, BoxError> {
        match std::env::var(name) {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map_err(|_| format!("{name} has an invalid value: {raw}").into()),
            _ => Ok(default),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let defaults = Self::default();
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let business_timezone = match std::env::var("BUSINESS_TIMEZONE") {
            Ok(name) => name
                .parse::<Tz>()
                .map_err(|e| format!("BUSINESS_TIMEZONE is invalid: {e}"))?,
            Err(_) => defaults.business_timezone,
        };

        let status_policy = match std::env::var("STATUS_POLICY") {
            Ok(raw) => raw.parse::<StatusPolicy>()?,
            Err(_) => defaults.status_policy,
        };

        let free_above = match std::env::var("FREE_DELIVERY_THRESHOLD") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| format!("FREE_DELIVERY_THRESHOLD has an invalid value: {raw}"))?,
            ),
            _ => None,
        };
        let flat_fee = Self::parsed("DELIVERY_FEE", defaults.delivery_fee.flat_fee)?;
        if flat_fee < 0 {
            return Err("DELIVERY_FEE must not be negative".into());
        }

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            http_port: Self::parsed("HTTP_PORT", defaults.http_port)?,
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            environment,
            business_timezone,
            status_policy,
            delivery_fee: DeliveryFeePolicy {
                flat_fee,
                free_above,
            },
            low_stock_threshold: Self::parsed("LOW_STOCK_THRESHOLD", defaults.low_stock_threshold)?,
            request_timeout_secs: Self::parsed(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            json_logs: std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_development_friendly() {
        let config = Config::default();
        assert_eq!(config.http_port, 3001);
        assert_eq!(config.status_policy, StatusPolicy::Strict);
        assert_eq!(config.delivery_fee.flat_fee, 500);
        assert_eq!(config.business_timezone, chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn secrets_fall_back_only_in_development() {
        let name = "DELIVERY_TEST_SECRET_THAT_IS_NEVER_SET";
        assert!(Config::require_secret(name, "development").is_ok());
        assert!(Config::require_secret(name, "production").is_err());
    }
}
