//! Order status machine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, ErrorCode};

/// Order status
///
/// Linear lifecycle: `AwaitingAcceptance -> Preparing -> EnRoute -> Complete`.
/// `Complete` is terminal and is also reached directly by settling payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    #[default]
    AwaitingAcceptance,
    Preparing,
    EnRoute,
    Complete,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::AwaitingAcceptance,
        OrderStatus::Preparing,
        OrderStatus::EnRoute,
        OrderStatus::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingAcceptance => "awaiting_acceptance",
            Self::Preparing => "preparing",
            Self::EnRoute => "en_route",
            Self::Complete => "complete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    /// Accepts the wire names case-insensitively, so `EN_ROUTE` and
    /// `en_route` are the same status.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::OrderInvalidStatus,
                    format!("Invalid order status: {}", s.trim()),
                )
            })
    }
}

/// Which restaurant-driven status changes are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Forward moves only (skipping states is fine); `Complete` is final
    #[default]
    Strict,
    /// Any of the four states may be written at any time
    Permissive,
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(format!("unknown status policy: {other}")),
        }
    }
}

/// Outcome of checking a requested status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Status must be written
    Apply,
    /// Requested status equals the current one; nothing to write
    Unchanged,
}

impl StatusPolicy {
    /// Check whether `from -> to` is allowed under this policy
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<Transition, AppError> {
        if from == to {
            return Ok(Transition::Unchanged);
        }
        match self {
            StatusPolicy::Permissive => Ok(Transition::Apply),
            StatusPolicy::Strict => {
                if from.is_terminal() || to < from {
                    Err(AppError::with_message(
                        ErrorCode::OrderInvalidTransition,
                        format!("Cannot change order status from {from} to {to}"),
                    ))
                } else {
                    Ok(Transition::Apply)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn parse_accepts_wire_names_in_any_case() {
        assert_eq!("awaiting_acceptance".parse::<OrderStatus>().unwrap(), AwaitingAcceptance);
        assert_eq!("PREPARING".parse::<OrderStatus>().unwrap(), Preparing);
        assert_eq!(" En_Route ".parse::<OrderStatus>().unwrap(), EnRoute);
        assert_eq!("complete".parse::<OrderStatus>().unwrap(), Complete);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = "delivered".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderInvalidStatus);
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&EnRoute).unwrap(), "\"en_route\"");
        let s: OrderStatus = serde_json::from_str("\"awaiting_acceptance\"").unwrap();
        assert_eq!(s, AwaitingAcceptance);
    }

    #[test]
    fn strict_allows_forward_moves_and_skips() {
        let p = StatusPolicy::Strict;
        assert_eq!(p.check(AwaitingAcceptance, Preparing).unwrap(), Transition::Apply);
        assert_eq!(p.check(Preparing, EnRoute).unwrap(), Transition::Apply);
        assert_eq!(p.check(AwaitingAcceptance, EnRoute).unwrap(), Transition::Apply);
        assert_eq!(p.check(EnRoute, Complete).unwrap(), Transition::Apply);
    }

    #[test]
    fn strict_rejects_backward_moves_and_leaving_complete() {
        let p = StatusPolicy::Strict;
        let err = p.check(EnRoute, AwaitingAcceptance).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderInvalidTransition);
        assert!(p.check(Complete, Preparing).is_err());
        assert!(p.check(Complete, AwaitingAcceptance).is_err());
    }

    #[test]
    fn same_state_is_a_no_op_under_both_policies() {
        for p in [StatusPolicy::Strict, StatusPolicy::Permissive] {
            for s in OrderStatus::ALL {
                assert_eq!(p.check(s, s).unwrap(), Transition::Unchanged);
            }
        }
    }

    #[test]
    fn permissive_allows_any_change() {
        let p = StatusPolicy::Permissive;
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(p.check(from, to).is_ok());
            }
        }
    }

    #[test]
    fn policy_parses_from_config_text() {
        assert_eq!("strict".parse::<StatusPolicy>().unwrap(), StatusPolicy::Strict);
        assert_eq!("PERMISSIVE".parse::<StatusPolicy>().unwrap(), StatusPolicy::Permissive);
        assert!("loose".parse::<StatusPolicy>().is_err());
    }
}
