//! Payment methods accepted at delivery

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, ErrorCode};

/// Payment method recorded when an order is settled
///
/// Older clients send the Portuguese names; they are accepted as aliases
/// but the canonical name is what gets stored and returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    Pix,
    #[serde(alias = "em_especie")]
    Cash,
    #[serde(alias = "credito")]
    Credit,
    #[serde(alias = "debito")]
    Debit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pix => "pix",
            Self::Cash => "cash",
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    /// Parse an optional wire value, distinguishing "missing" from "unknown"
    pub fn parse_required(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim) {
            None | Some("") => Err(AppError::new(ErrorCode::PaymentMethodRequired)),
            Some(v) => v.parse(),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pix" => Ok(Self::Pix),
            "cash" | "em_especie" => Ok(Self::Cash),
            "credit" | "credito" => Ok(Self::Credit),
            "debit" | "debito" => Ok(Self::Debit),
            _ => Err(AppError::with_message(
                ErrorCode::PaymentInvalidMethod,
                format!("Invalid payment method: {}", s.trim()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names_and_aliases() {
        assert_eq!("pix".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("em_especie".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("CREDITO".parse::<PaymentMethod>().unwrap(), PaymentMethod::Credit);
        assert_eq!("debito".parse::<PaymentMethod>().unwrap(), PaymentMethod::Debit);
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = "bitcoin".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentInvalidMethod);
    }

    #[test]
    fn missing_method_is_its_own_error() {
        assert_eq!(
            PaymentMethod::parse_required(None).unwrap_err().code,
            ErrorCode::PaymentMethodRequired
        );
        assert_eq!(
            PaymentMethod::parse_required(Some("  ")).unwrap_err().code,
            ErrorCode::PaymentMethodRequired
        );
        assert_eq!(
            PaymentMethod::parse_required(Some("debit")).unwrap(),
            PaymentMethod::Debit
        );
    }

    #[test]
    fn serde_accepts_aliases_and_emits_canonical() {
        let m: PaymentMethod = serde_json::from_str("\"credito\"").unwrap();
        assert_eq!(m, PaymentMethod::Credit);
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"credit\"");
    }
}
