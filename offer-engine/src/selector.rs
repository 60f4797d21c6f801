//! Offer Selector - reconciles a cart's applied-offer set with the catalog
//!
//! The selector is the only writer of `cart.applied_offers`. Every cart
//! mutation routes through [`recompute`], which re-evaluates the full
//! catalog snapshot and rebuilds the set: eligible auto-apply offers are
//! upserted, ineligible ones removed, and the single manual offer is kept
//! only while it stays eligible. Discount amounts are frozen at apply time
//! and refreshed on each recomputation.

use crate::catalog::CatalogSnapshot;
use crate::pricing::{calculator, eligibility};
use serde::Serialize;
use shared::cart::{AppliedOffer, Cart};
use shared::error::{AppError, ErrorCode, RejectionReason};
use shared::models::{CustomerContext, Offer};
use std::collections::BTreeMap;

/// Result of one full recomputation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecomputeOutcome {
    /// Applied offers after the pass, in cart order
    pub applied: Vec<AppliedOffer>,
    /// Offers that failed an eligibility check this pass, keyed by offer id.
    /// Covers every catalog offer, manual candidates included; eligible
    /// manual offers awaiting explicit application appear in neither set.
    pub rejected: BTreeMap<String, RejectionReason>,
    /// The manual offer that was evicted this pass, if any, with the reason
    pub evicted_manual: Option<(String, RejectionReason)>,
}

/// Result of a manual apply
#[derive(Debug, Clone, Serialize)]
pub struct ManualApplyOutcome {
    pub offer_id: String,
    pub discount_amount: f64,
    /// Previous manual offer replaced by this apply, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_offer_id: Option<String>,
}

/// Re-evaluate every offer in the snapshot against the cart and rebuild the
/// applied set.
///
/// An empty cart drops every applied offer and reports nothing rejected.
/// Evaluation walks the snapshot in its sorted order, so the same cart and
/// snapshot always produce the same applied set.
pub fn recompute(
    cart: &mut Cart,
    snapshot: &CatalogSnapshot,
    customer: &CustomerContext,
    now_ms: i64,
) -> RecomputeOutcome {
    if cart.is_empty() {
        cart.applied_offers.clear();
        return RecomputeOutcome::default();
    }

    let mut outcome = RecomputeOutcome::default();
    let manual_id = cart.manual_offer().map(|a| a.offer_id.clone());
    let previous: BTreeMap<String, AppliedOffer> = cart
        .applied_offers
        .iter()
        .map(|a| (a.offer_id.clone(), a.clone()))
        .collect();

    let mut next: Vec<AppliedOffer> = Vec::new();

    for offer in &snapshot.offers {
        let is_manual = manual_id.as_deref() == Some(offer.id.as_str());

        match eligibility::evaluate(offer, cart, customer, &snapshot.product_meta, now_ms) {
            Ok(()) => {
                // Eligible manual candidates stay dormant until the customer
                // applies them explicitly
                if !offer.auto_apply && !is_manual {
                    continue;
                }
                let discount = calculator::compute(offer, cart, &snapshot.product_meta);
                // Keep the original applied_at for offers already on the cart
                let applied_at = previous
                    .get(&offer.id)
                    .map(|a| a.applied_at)
                    .unwrap_or(now_ms);
                let mut entry = AppliedOffer::from_offer(offer, discount, applied_at);
                entry.auto_apply = !is_manual;
                next.push(entry);
            }
            Err(reason) => {
                if is_manual {
                    outcome.evicted_manual = Some((offer.id.clone(), reason));
                }
                outcome.rejected.insert(offer.id.clone(), reason);
            }
        }
    }

    // A manual offer whose catalog entry vanished is dropped without a reason
    if let Some(id) = &manual_id
        && snapshot.offer(id).is_none()
    {
        tracing::warn!(offer_id = %id, cart_id = %cart.id, "applied offer no longer in catalog, dropping");
    }

    cart.applied_offers = next.clone();
    cart.updated_at = now_ms;
    outcome.applied = next;
    outcome
}

/// Apply an offer the customer selected explicitly.
///
/// At most one manual offer may be applied; applying a second one replaces
/// the first. Re-applying the offer already on the cart is an error.
pub fn apply_manual(
    cart: &mut Cart,
    offer: &Offer,
    snapshot: &CatalogSnapshot,
    customer: &CustomerContext,
    now_ms: i64,
) -> Result<ManualApplyOutcome, AppError> {
    if cart.is_empty() {
        return Err(AppError::empty_cart().with_detail("cart_id", cart.id.clone()));
    }
    if let Some(existing) = cart.find_applied(&offer.id) {
        return Err(AppError::with_message(
            ErrorCode::OfferAlreadyApplied,
            format!("Offer {} is already applied to this cart", existing.code),
        )
        .with_detail("offer_id", offer.id.clone()));
    }

    eligibility::evaluate(offer, cart, customer, &snapshot.product_meta, now_ms)
        .map_err(AppError::not_eligible)?;

    let replaced_offer_id = cart.manual_offer().map(|a| a.offer_id.clone());
    cart.applied_offers.retain(|a| a.auto_apply);

    let discount = calculator::compute(offer, cart, &snapshot.product_meta);
    let entry = AppliedOffer::from_offer(offer, discount, now_ms);
    cart.applied_offers.push(entry);
    cart.updated_at = now_ms;

    tracing::info!(
        offer_id = %offer.id,
        cart_id = %cart.id,
        discount,
        replaced = replaced_offer_id.as_deref().unwrap_or("-"),
        "manual offer applied"
    );

    Ok(ManualApplyOutcome {
        offer_id: offer.id.clone(),
        discount_amount: discount,
        replaced_offer_id,
    })
}

/// Remove an applied offer by id (manual or auto)
pub fn remove(cart: &mut Cart, offer_id: &str, now_ms: i64) -> Result<AppliedOffer, AppError> {
    let position = cart
        .applied_offers
        .iter()
        .position(|a| a.offer_id == offer_id)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::OfferNotApplied,
                format!("Offer {} is not applied to this cart", offer_id),
            )
        })?;
    let removed = cart.applied_offers.remove(position);
    cart.updated_at = now_ms;
    Ok(removed)
}
