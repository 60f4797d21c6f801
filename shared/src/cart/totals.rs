//! Cart totals - output of the pricing pipeline

use serde::{Deserialize, Serialize};

/// Totals produced by one pricing pass over a cart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct CartTotals {
    /// Sum of unit list price x quantity over all line items
    pub subtotal: f64,
    /// Sum of (list - discounted) x quantity; catalog discounts,
    /// independent of offers
    pub product_discount_total: f64,
    /// Sum of currently valid applied-offer discount amounts
    pub offer_discount_total: f64,
    /// max(0, subtotal - product_discount_total - offer_discount_total)
    pub grand_total: f64,
}
