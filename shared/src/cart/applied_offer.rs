//! Applied Offer - the record of an offer currently in effect on a cart

use crate::models::Offer;
use serde::{Deserialize, Serialize};

/// Applied offer record
///
/// `discount_amount` is frozen at application time; the selector re-freezes
/// it on every recomputation pass rather than deriving it implicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedOffer {
    // === Offer Identity ===
    pub offer_id: String,
    pub code: String,
    pub name: String,

    // === Frozen Calculation ===
    /// Computed discount at application time
    pub discount_amount: f64,

    // === Control ===
    /// Copied from the offer's `auto_apply` at application time
    pub auto_apply: bool,
    /// Timestamp applied (Unix millis)
    pub applied_at: i64,
}

impl AppliedOffer {
    /// Create from an Offer with a computed discount amount
    pub fn from_offer(offer: &Offer, discount_amount: f64, applied_at: i64) -> Self {
        Self {
            offer_id: offer.id.clone(),
            code: offer.code.clone(),
            name: offer.name.clone(),
            discount_amount,
            auto_apply: offer.auto_apply,
            applied_at,
        }
    }
}
