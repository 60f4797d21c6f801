//! Offer scope and validity matching
//!
//! Predicate helpers shared by the eligibility evaluator and the discount
//! calculator.

use crate::catalog::ProductMeta;
use shared::cart::{Cart, CartLineItem};
use shared::models::{Offer, OfferKind};
use std::collections::HashMap;

/// Check if the current time falls inside the offer's validity window.
/// The window is half-open: [starts_at, ends_at).
pub fn is_window_valid(offer: &Offer, now_ms: i64) -> bool {
    now_ms >= offer.starts_at && now_ms < offer.ends_at
}

/// Check if a single line item falls inside the offer's scope.
///
/// An item qualifies when it matches the explicit product set, or when its
/// product's category matches the explicit category set. An unscoped offer
/// (both sets empty) matches every item.
pub fn item_in_scope(
    offer: &Offer,
    item: &CartLineItem,
    meta: &HashMap<String, ProductMeta>,
) -> bool {
    if !offer.is_scoped() {
        return true;
    }
    if offer.product_ids.iter().any(|p| *p == item.product_id) {
        return true;
    }
    if !offer.category_ids.is_empty()
        && let Some(m) = meta.get(&item.product_id)
    {
        return offer.category_ids.iter().any(|c| *c == m.category_id);
    }
    false
}

/// The cart line items an offer's discount applies to
pub fn scoped_items<'a>(
    offer: &Offer,
    cart: &'a Cart,
    meta: &HashMap<String, ProductMeta>,
) -> Vec<&'a CartLineItem> {
    cart.items
        .iter()
        .filter(|item| item_in_scope(offer, item, meta))
        .collect()
}

/// Check if at least one cart item matches the explicit product set
pub fn matches_product_set(offer: &Offer, cart: &Cart) -> bool {
    cart.items
        .iter()
        .any(|item| offer.product_ids.iter().any(|p| *p == item.product_id))
}

/// Check if at least one cart item's category matches the explicit
/// category set
pub fn matches_category_set(
    offer: &Offer,
    cart: &Cart,
    meta: &HashMap<String, ProductMeta>,
) -> bool {
    cart.items.iter().any(|item| {
        meta.get(&item.product_id)
            .map(|m| offer.category_ids.iter().any(|c| *c == m.category_id))
            .unwrap_or(false)
    })
}

/// Required combo products missing from the cart, for `ComboBundle` offers
pub fn combo_missing_products(offer: &Offer, cart: &Cart) -> Vec<String> {
    match &offer.kind {
        OfferKind::ComboBundle { product_ids, .. } => product_ids
            .iter()
            .filter(|p| cart.find_item(p).is_none())
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Total quantity of qualifying units for a `BuyXGetY` offer
pub fn qualifying_quantity(
    offer: &Offer,
    cart: &Cart,
    meta: &HashMap<String, ProductMeta>,
) -> i32 {
    scoped_items(offer, cart, meta)
        .iter()
        .map(|i| i.quantity)
        .sum()
}
