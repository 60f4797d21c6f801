//! Eligibility rejection reasons
//!
//! These are expected, user-facing outcomes of evaluating an offer against a
//! cart. They are returned as structured data so callers can surface
//! actionable messages, and must never abort the pricing pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an offer was rejected by the eligibility evaluator.
///
/// The variants mirror the evaluator's check order; the first failing check
/// wins, so reasons are deterministic for a given cart/offer pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// Offer is deactivated
    Inactive,
    /// Current time is outside the offer's validity window
    Expired,
    /// Customer already has a completed order
    NotFirstTime,
    /// Cart subtotal is below the offer's minimum order value
    MinOrderNotMet,
    /// No cart line item matches the offer's product/category scope
    ScopeMismatch,
    /// Cart does not hold enough qualifying units (BuyXGetY)
    InsufficientQuantity,
}

impl RejectionReason {
    /// Human-readable message suitable for direct display
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::Inactive => "This offer is no longer active",
            RejectionReason::Expired => "This offer is outside its validity period",
            RejectionReason::NotFirstTime => "This offer is only for first-time customers",
            RejectionReason::MinOrderNotMet => "Cart total is below the minimum order value",
            RejectionReason::ScopeMismatch => "No items in the cart qualify for this offer",
            RejectionReason::InsufficientQuantity => "Not enough qualifying items in the cart",
        }
    }

    /// The wire-format code (SCREAMING_SNAKE_CASE), e.g. `MIN_ORDER_NOT_MET`
    pub fn as_code(&self) -> &'static str {
        match self {
            RejectionReason::Inactive => "INACTIVE",
            RejectionReason::Expired => "EXPIRED",
            RejectionReason::NotFirstTime => "NOT_FIRST_TIME",
            RejectionReason::MinOrderNotMet => "MIN_ORDER_NOT_MET",
            RejectionReason::ScopeMismatch => "SCOPE_MISMATCH",
            RejectionReason::InsufficientQuantity => "INSUFFICIENT_QUANTITY",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_screaming_snake_case() {
        let json = serde_json::to_string(&RejectionReason::MinOrderNotMet).unwrap();
        assert_eq!(json, "\"MIN_ORDER_NOT_MET\"");
        let reason: RejectionReason = serde_json::from_str("\"SCOPE_MISMATCH\"").unwrap();
        assert_eq!(reason, RejectionReason::ScopeMismatch);
    }

    #[test]
    fn test_display_matches_wire_code() {
        assert_eq!(RejectionReason::Expired.to_string(), "EXPIRED");
        assert_eq!(
            RejectionReason::InsufficientQuantity.to_string(),
            "INSUFFICIENT_QUANTITY"
        );
    }
}
