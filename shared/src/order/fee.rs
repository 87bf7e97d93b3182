//! Delivery fee computed at checkout

use serde::{Deserialize, Serialize};

/// Flat delivery fee, optionally waived above a subtotal threshold
///
/// All amounts are integer minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFeePolicy {
    pub flat_fee: i64,
    pub free_above: Option<i64>,
}

impl Default for DeliveryFeePolicy {
    fn default() -> Self {
        Self {
            flat_fee: 500,
            free_above: None,
        }
    }
}

impl DeliveryFeePolicy {
    pub fn fee_for(&self, subtotal: i64) -> i64 {
        match self.free_above {
            Some(threshold) if subtotal >= threshold => 0,
            _ => self.flat_fee,
        }
    }
}

/// Money breakdown stored on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub fee: i64,
    pub total: i64,
}

impl OrderTotals {
    /// `None` when the total does not fit in an `i64`
    pub fn compute(subtotal: i64, policy: &DeliveryFeePolicy) -> Option<Self> {
        let fee = policy.fee_for(subtotal);
        Some(Self {
            subtotal,
            fee,
            total: subtotal.checked_add(fee)?,
        })
    }
}
