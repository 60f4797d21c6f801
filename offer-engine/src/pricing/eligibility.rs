//! Eligibility Evaluator
//!
//! Pure function over one offer, one cart snapshot, and one customer
//! context. Checks run in a fixed order and short-circuit on the first
//! failure, so the reported reason is deterministic for a given input.
//!
//! Eligibility never computes discounts and the calculator never re-checks
//! eligibility.

use crate::catalog::ProductMeta;
use crate::money::{effective_subtotal, to_decimal};
use crate::pricing::matcher;
use shared::cart::Cart;
use shared::error::RejectionReason;
use shared::models::{CustomerContext, Offer, OfferKind};
use std::collections::HashMap;

/// Evaluate one offer against a cart and customer context.
///
/// Check order (short-circuiting):
/// 1. activation flag
/// 2. validity window
/// 3. first-purchase restriction
/// 4. minimum order value (post-product-discount subtotal)
/// 5. scope match (combo offers require every bundle product)
/// 6. qualifying quantity (BuyXGetY)
pub fn evaluate(
    offer: &Offer,
    cart: &Cart,
    customer: &CustomerContext,
    meta: &HashMap<String, ProductMeta>,
    now_ms: i64,
) -> Result<(), RejectionReason> {
    if !offer.is_active {
        return Err(RejectionReason::Inactive);
    }

    if !matcher::is_window_valid(offer, now_ms) {
        return Err(RejectionReason::Expired);
    }

    if offer.requires_first_purchase() && customer.has_completed_order {
        return Err(RejectionReason::NotFirstTime);
    }

    let subtotal = effective_subtotal(&cart.items);
    if subtotal < to_decimal(offer.min_order_value) {
        return Err(RejectionReason::MinOrderNotMet);
    }

    check_scope(offer, cart, meta)?;

    if let OfferKind::BuyXGetY { buy_quantity, .. } = &offer.kind
        && matcher::qualifying_quantity(offer, cart, meta) < *buy_quantity
    {
        return Err(RejectionReason::InsufficientQuantity);
    }

    Ok(())
}

/// Scope check. Each explicitly declared set must be satisfied; combo
/// bundles require every listed product to be present in the cart.
fn check_scope(
    offer: &Offer,
    cart: &Cart,
    meta: &HashMap<String, ProductMeta>,
) -> Result<(), RejectionReason> {
    if let OfferKind::ComboBundle { .. } = &offer.kind {
        if !matcher::combo_missing_products(offer, cart).is_empty() {
            return Err(RejectionReason::ScopeMismatch);
        }
        return Ok(());
    }

    if !offer.product_ids.is_empty() && !matcher::matches_product_set(offer, cart) {
        return Err(RejectionReason::ScopeMismatch);
    }
    if !offer.category_ids.is_empty() && !matcher::matches_category_set(offer, cart, meta) {
        return Err(RejectionReason::ScopeMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::cart::CartLineItem;

    const NOW: i64 = 1500;

    fn make_offer(kind: OfferKind) -> Offer {
        Offer {
            id: "offer-1".to_string(),
            name: "Test".to_string(),
            code: "TEST".to_string(),
            kind,
            product_ids: vec![],
            category_ids: vec![],
            min_order_value: 0.0,
            max_discount_cap: None,
            starts_at: 1000,
            ends_at: 2000,
            is_active: true,
            auto_apply: false,
            first_time_only: false,
            badge_text: None,
            description: None,
            usage_count: 0,
            created_at: 0,
        }
    }

    fn percent_offer() -> Offer {
        make_offer(OfferKind::PercentageDiscount { percent: 20.0 })
    }

    fn cart_with(items: Vec<(&str, i32, f64, Option<f64>)>) -> Cart {
        let mut cart = Cart::new("cart-1", None, 0);
        for (pid, quantity, list, discounted) in items {
            cart.items.push(CartLineItem {
                product_id: pid.to_string(),
                name: pid.to_string(),
                quantity,
                unit_list_price: list,
                unit_discounted_price: discounted,
            });
        }
        cart
    }

    fn no_meta() -> HashMap<String, ProductMeta> {
        HashMap::new()
    }

    #[test]
    fn test_inactive_checked_first() {
        let mut offer = percent_offer();
        offer.is_active = false;
        // Also outside the window: inactive must win because it is checked first
        let cart = cart_with(vec![("p1", 1, 100.0, None)]);
        let result = evaluate(&offer, &cart, &CustomerContext::anonymous(), &no_meta(), 5000);
        assert_eq!(result, Err(RejectionReason::Inactive));
    }

    #[test]
    fn test_expired_window() {
        let offer = percent_offer();
        let cart = cart_with(vec![("p1", 1, 100.0, None)]);
        let customer = CustomerContext::anonymous();
        assert_eq!(
            evaluate(&offer, &cart, &customer, &no_meta(), 2000),
            Err(RejectionReason::Expired)
        );
        assert_eq!(
            evaluate(&offer, &cart, &customer, &no_meta(), 500),
            Err(RejectionReason::Expired)
        );
        assert!(evaluate(&offer, &cart, &customer, &no_meta(), NOW).is_ok());
    }

    #[test]
    fn test_first_purchase_only_kind() {
        let offer = make_offer(OfferKind::FirstPurchaseOnly { percent: 10.0 });
        let cart = cart_with(vec![("p1", 1, 100.0, None)]);

        let returning = CustomerContext::returning("cust-1");
        assert_eq!(
            evaluate(&offer, &cart, &returning, &no_meta(), NOW),
            Err(RejectionReason::NotFirstTime)
        );

        let first_timer = CustomerContext::first_time("cust-2");
        assert!(evaluate(&offer, &cart, &first_timer, &no_meta(), NOW).is_ok());
    }

    #[test]
    fn test_first_time_only_flag_independent_of_kind() {
        let mut offer = percent_offer();
        offer.first_time_only = true;
        let cart = cart_with(vec![("p1", 1, 100.0, None)]);
        assert_eq!(
            evaluate(&offer, &cart, &CustomerContext::returning("c"), &no_meta(), NOW),
            Err(RejectionReason::NotFirstTime)
        );
    }

    #[test]
    fn test_min_order_uses_discounted_prices() {
        let mut offer = percent_offer();
        offer.min_order_value = 500.0;
        let customer = CustomerContext::anonymous();

        // List total 600, but effective total 450: below the minimum
        let cart = cart_with(vec![("p1", 3, 200.0, Some(150.0))]);
        assert_eq!(
            evaluate(&offer, &cart, &customer, &no_meta(), NOW),
            Err(RejectionReason::MinOrderNotMet)
        );

        // Effective total exactly at the minimum qualifies
        let cart = cart_with(vec![("p1", 1, 500.0, None)]);
        assert!(evaluate(&offer, &cart, &customer, &no_meta(), NOW).is_ok());
    }

    #[test]
    fn test_scope_mismatch_product_set() {
        let mut offer = percent_offer();
        offer.product_ids = vec!["p9".to_string()];
        let cart = cart_with(vec![("p1", 1, 100.0, None)]);
        assert_eq!(
            evaluate(&offer, &cart, &CustomerContext::anonymous(), &no_meta(), NOW),
            Err(RejectionReason::ScopeMismatch)
        );
    }

    #[test]
    fn test_scope_mismatch_category_set() {
        let mut offer = make_offer(OfferKind::CategoryScoped { percent: 10.0 });
        offer.category_ids = vec!["cat-1".to_string()];
        let cart = cart_with(vec![("p1", 1, 100.0, None)]);

        let mut meta = HashMap::new();
        meta.insert(
            "p1".to_string(),
            ProductMeta {
                category_id: "cat-2".to_string(),
                list_price: 100.0,
                discounted_price: None,
            },
        );
        assert_eq!(
            evaluate(&offer, &cart, &CustomerContext::anonymous(), &meta, NOW),
            Err(RejectionReason::ScopeMismatch)
        );

        meta.get_mut("p1").unwrap().category_id = "cat-1".to_string();
        assert!(evaluate(&offer, &cart, &CustomerContext::anonymous(), &meta, NOW).is_ok());
    }

    #[test]
    fn test_combo_requires_every_product() {
        let offer = make_offer(OfferKind::ComboBundle {
            product_ids: vec!["p1".to_string(), "p2".to_string()],
            bundle_price: 150.0,
        });
        let customer = CustomerContext::anonymous();

        let partial = cart_with(vec![("p1", 1, 100.0, None)]);
        assert_eq!(
            evaluate(&offer, &partial, &customer, &no_meta(), NOW),
            Err(RejectionReason::ScopeMismatch)
        );

        let full = cart_with(vec![("p1", 1, 100.0, None), ("p2", 1, 100.0, None)]);
        assert!(evaluate(&offer, &full, &customer, &no_meta(), NOW).is_ok());
    }

    #[test]
    fn test_buy_x_get_y_quantity_threshold() {
        let offer = make_offer(OfferKind::BuyXGetY {
            buy_quantity: 2,
            get_quantity: 1,
            free_product_id: None,
        });
        let customer = CustomerContext::anonymous();

        let one_unit = cart_with(vec![("p1", 1, 100.0, None)]);
        assert_eq!(
            evaluate(&offer, &one_unit, &customer, &no_meta(), NOW),
            Err(RejectionReason::InsufficientQuantity)
        );

        let two_units = cart_with(vec![("p1", 2, 100.0, None)]);
        assert!(evaluate(&offer, &two_units, &customer, &no_meta(), NOW).is_ok());
    }

    #[test]
    fn test_min_order_beats_scope_in_check_order() {
        let mut offer = percent_offer();
        offer.min_order_value = 500.0;
        offer.product_ids = vec!["p9".to_string()];
        // Fails both min-order and scope; min-order is reported
        let cart = cart_with(vec![("p1", 1, 100.0, None)]);
        assert_eq!(
            evaluate(&offer, &cart, &CustomerContext::anonymous(), &no_meta(), NOW),
            Err(RejectionReason::MinOrderNotMet)
        );
    }
}
