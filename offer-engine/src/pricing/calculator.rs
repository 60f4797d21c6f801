//! Discount Calculator
//!
//! Computes the monetary discount for an offer whose eligibility is already
//! established. Never re-checks eligibility. All arithmetic uses Decimal;
//! results are rounded to two decimal places half-up and clamped so a
//! discount can never exceed the value of the items it discounts, nor the
//! offer's cap.

use crate::catalog::ProductMeta;
use crate::money::{percentage_of, round_money, to_decimal, to_f64};
use crate::pricing::matcher;
use rust_decimal::Decimal;
use shared::cart::{Cart, CartLineItem};
use shared::models::{Offer, OfferKind};
use std::collections::HashMap;

/// Compute the discount amount for an eligible offer.
///
/// Returns an f64 rounded to money precision; zero when the offer
/// contributes nothing (e.g. a BuyXGetY with no complete set yet).
pub fn compute(offer: &Offer, cart: &Cart, meta: &HashMap<String, ProductMeta>) -> f64 {
    let scoped = matcher::scoped_items(offer, cart, meta);
    let scoped_subtotal: Decimal = scoped
        .iter()
        .map(|i| to_decimal(i.effective_unit_price()) * Decimal::from(i.quantity))
        .sum();

    let raw = match &offer.kind {
        OfferKind::PercentageDiscount { percent }
        | OfferKind::CategoryScoped { percent }
        | OfferKind::FirstPurchaseOnly { percent } => percentage_of(scoped_subtotal, *percent),
        OfferKind::FlatAmountDiscount { amount } => to_decimal(*amount).min(scoped_subtotal),
        OfferKind::BuyXGetY {
            buy_quantity,
            get_quantity,
            free_product_id,
        } => buy_x_get_y(
            &scoped,
            scoped_subtotal,
            *buy_quantity,
            *get_quantity,
            free_product_id.as_deref(),
        ),
        OfferKind::ComboBundle {
            product_ids,
            bundle_price,
        } => combo_bundle(product_ids, *bundle_price, meta),
    };

    // A discount never exceeds the scoped items' value nor the offer's cap
    let mut discount = raw.min(scoped_subtotal).max(Decimal::ZERO);
    if let Some(cap) = offer.max_discount_cap {
        discount = discount.min(to_decimal(cap));
    }
    to_f64(discount)
}

/// BuyXGetY: one free unit of the designated product (or the cheapest
/// qualifying one) per complete buy+get set.
fn buy_x_get_y(
    scoped: &[&CartLineItem],
    scoped_subtotal: Decimal,
    buy_quantity: i32,
    get_quantity: i32,
    free_product_id: Option<&str>,
) -> Decimal {
    let total_quantity: i32 = scoped.iter().map(|i| i.quantity).sum();
    let set_size = buy_quantity + get_quantity;
    if set_size <= 0 || total_quantity < set_size {
        return Decimal::ZERO;
    }
    let sets = total_quantity / set_size;

    let free_unit_price = free_product_id
        .and_then(|pid| scoped.iter().find(|i| i.product_id == pid))
        .map(|i| to_decimal(i.effective_unit_price()))
        .or_else(|| {
            scoped
                .iter()
                .map(|i| to_decimal(i.effective_unit_price()))
                .min()
        })
        .unwrap_or(Decimal::ZERO);

    let discount = free_unit_price * Decimal::from(sets) * Decimal::from(get_quantity);
    round_money(discount.min(scoped_subtotal))
}

/// ComboBundle: the gap between the sum of the required products' list
/// prices and the fixed bundle price. The selector only routes combos here
/// once every required product is present.
fn combo_bundle(
    product_ids: &[String],
    bundle_price: f64,
    meta: &HashMap<String, ProductMeta>,
) -> Decimal {
    let mut list_sum = Decimal::ZERO;
    for pid in product_ids {
        match meta.get(pid) {
            Some(m) => list_sum += to_decimal(m.list_price),
            None => {
                tracing::warn!(product_id = %pid, "combo product missing from catalog meta");
                return Decimal::ZERO;
            }
        }
    }
    round_money((list_sum - to_decimal(bundle_price)).max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

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
            starts_at: 0,
            ends_at: i64::MAX,
            is_active: true,
            auto_apply: false,
            first_time_only: false,
            badge_text: None,
            description: None,
            usage_count: 0,
            created_at: 0,
        }
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
    fn test_percentage_on_full_subtotal() {
        // spec scenario: 1000 subtotal, 20% -> 200
        let offer = make_offer(OfferKind::PercentageDiscount { percent: 20.0 });
        let cart = cart_with(vec![("p1", 2, 300.0, None), ("p2", 1, 400.0, None)]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 200.0);
    }

    #[test]
    fn test_percentage_uses_discounted_prices() {
        let offer = make_offer(OfferKind::PercentageDiscount { percent: 10.0 });
        // Effective subtotal 90, not 100
        let cart = cart_with(vec![("p1", 1, 100.0, Some(90.0))]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 9.0);
    }

    #[test]
    fn test_percentage_scoped_to_product_set() {
        let mut offer = make_offer(OfferKind::PercentageDiscount { percent: 50.0 });
        offer.product_ids = vec!["p1".to_string()];
        let cart = cart_with(vec![("p1", 1, 100.0, None), ("p2", 1, 900.0, None)]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 50.0);
    }

    #[test]
    fn test_percentage_rounding_half_up() {
        let offer = make_offer(OfferKind::PercentageDiscount { percent: 15.0 });
        // 15% of 0.10 = 0.015 -> 0.02
        let cart = cart_with(vec![("p1", 1, 0.10, None)]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 0.02);
    }

    #[test]
    fn test_percentage_cap_applies() {
        let mut offer = make_offer(OfferKind::PercentageDiscount { percent: 20.0 });
        offer.max_discount_cap = Some(150.0);
        let cart = cart_with(vec![("p1", 1, 1000.0, None)]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 150.0);
    }

    #[test]
    fn test_flat_amount_clamped_to_subtotal() {
        // spec scenario: FLAT500 on a 400 cart -> 400
        let offer = make_offer(OfferKind::FlatAmountDiscount { amount: 500.0 });
        let cart = cart_with(vec![("p1", 1, 400.0, None)]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 400.0);

        let rich_cart = cart_with(vec![("p1", 1, 900.0, None)]);
        assert_eq!(compute(&offer, &rich_cart, &no_meta()), 500.0);
    }

    #[test]
    fn test_flat_amount_scoped() {
        let mut offer = make_offer(OfferKind::FlatAmountDiscount { amount: 500.0 });
        offer.product_ids = vec!["p1".to_string()];
        // Scoped subtotal is 100 even though the cart holds 1100
        let cart = cart_with(vec![("p1", 1, 100.0, None), ("p2", 1, 1000.0, None)]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 100.0);
    }

    #[test]
    fn test_buy_x_get_y_sets() {
        // spec scenario: buy 2 get 1, 6 units at 100 -> 2 free -> 200
        let offer = make_offer(OfferKind::BuyXGetY {
            buy_quantity: 2,
            get_quantity: 1,
            free_product_id: None,
        });
        let cart = cart_with(vec![("p1", 6, 100.0, None)]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 200.0);
    }

    #[test]
    fn test_buy_x_get_y_incomplete_set_is_zero() {
        let offer = make_offer(OfferKind::BuyXGetY {
            buy_quantity: 2,
            get_quantity: 1,
            free_product_id: None,
        });
        // Eligible at 2 units, but no complete buy+get set of 3
        let cart = cart_with(vec![("p1", 2, 100.0, None)]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 0.0);
    }

    #[test]
    fn test_buy_x_get_y_free_unit_is_cheapest_by_default() {
        let offer = make_offer(OfferKind::BuyXGetY {
            buy_quantity: 1,
            get_quantity: 1,
            free_product_id: None,
        });
        let cart = cart_with(vec![("p1", 1, 100.0, None), ("p2", 1, 40.0, None)]);
        // One set of 2 units; cheapest unit (40) goes free
        assert_eq!(compute(&offer, &cart, &no_meta()), 40.0);
    }

    #[test]
    fn test_buy_x_get_y_designated_free_product() {
        let offer = make_offer(OfferKind::BuyXGetY {
            buy_quantity: 1,
            get_quantity: 1,
            free_product_id: Some("p1".to_string()),
        });
        let cart = cart_with(vec![("p1", 1, 100.0, None), ("p2", 1, 40.0, None)]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 100.0);
    }

    #[test]
    fn test_buy_x_get_y_designated_product_absent_falls_back() {
        let offer = make_offer(OfferKind::BuyXGetY {
            buy_quantity: 1,
            get_quantity: 1,
            free_product_id: Some("p-gone".to_string()),
        });
        let cart = cart_with(vec![("p1", 2, 60.0, None)]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 60.0);
    }

    #[test]
    fn test_buy_x_get_y_honors_cap() {
        let mut offer = make_offer(OfferKind::BuyXGetY {
            buy_quantity: 2,
            get_quantity: 1,
            free_product_id: None,
        });
        offer.max_discount_cap = Some(150.0);
        let cart = cart_with(vec![("p1", 6, 100.0, None)]);
        assert_eq!(compute(&offer, &cart, &no_meta()), 150.0);
    }

    #[test]
    fn test_combo_bundle_gap() {
        let offer = make_offer(OfferKind::ComboBundle {
            product_ids: vec!["p1".to_string(), "p2".to_string()],
            bundle_price: 150.0,
        });
        let cart = cart_with(vec![("p1", 1, 100.0, None), ("p2", 1, 100.0, None)]);
        let mut meta = HashMap::new();
        for pid in ["p1", "p2"] {
            meta.insert(
                pid.to_string(),
                ProductMeta {
                    category_id: "cat-1".to_string(),
                    list_price: 100.0,
                    discounted_price: None,
                },
            );
        }
        // 200 list total - 150 bundle price = 50
        assert_eq!(compute(&offer, &cart, &meta), 50.0);
    }

    #[test]
    fn test_combo_bundle_never_negative() {
        let offer = make_offer(OfferKind::ComboBundle {
            product_ids: vec!["p1".to_string(), "p2".to_string()],
            bundle_price: 500.0,
        });
        let cart = cart_with(vec![("p1", 1, 100.0, None), ("p2", 1, 100.0, None)]);
        let mut meta = HashMap::new();
        for pid in ["p1", "p2"] {
            meta.insert(
                pid.to_string(),
                ProductMeta {
                    category_id: "cat-1".to_string(),
                    list_price: 100.0,
                    discounted_price: None,
                },
            );
        }
        assert_eq!(compute(&offer, &cart, &meta), 0.0);
    }

    #[test]
    fn test_discount_never_exceeds_scoped_value() {
        // Defensive clamp even with a 100% percentage
        let offer = make_offer(OfferKind::PercentageDiscount { percent: 100.0 });
        let cart = cart_with(vec![("p1", 3, 33.33, None)]);
        let discount = compute(&offer, &cart, &no_meta());
        assert!(discount <= 99.99);
        assert_eq!(discount, 99.99);
    }
}
