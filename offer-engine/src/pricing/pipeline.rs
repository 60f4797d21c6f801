//! Cart totals pipeline
//!
//! Folds a cart into its display totals. Reads frozen discount amounts
//! from the applied-offer entries; never re-evaluates offers.

use crate::money::{to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::cart::{Cart, CartTotals};

/// Compute the totals for a cart.
///
/// subtotal is the pre-discount list total; the grand total subtracts both
/// product-level discounts and the frozen offer discounts, floored at zero.
pub fn price(cart: &Cart) -> CartTotals {
    let mut subtotal = Decimal::ZERO;
    let mut product_discount_total = Decimal::ZERO;

    for item in &cart.items {
        let quantity = Decimal::from(item.quantity);
        let list = to_decimal(item.unit_list_price);
        subtotal += list * quantity;

        let effective = to_decimal(item.effective_unit_price());
        product_discount_total += (list - effective).max(Decimal::ZERO) * quantity;
    }

    let offer_discount_total: Decimal = cart
        .applied_offers
        .iter()
        .map(|a| to_decimal(a.discount_amount))
        .sum();

    let grand_total =
        (subtotal - product_discount_total - offer_discount_total).max(Decimal::ZERO);

    CartTotals {
        subtotal: to_f64(subtotal),
        product_discount_total: to_f64(product_discount_total),
        offer_discount_total: to_f64(offer_discount_total),
        grand_total: to_f64(grand_total),
    }
}
