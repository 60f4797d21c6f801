//! Cart and line-item types
//!
//! The cart is owned by the external cart store; the engine consumes
//! immutable snapshots of it and writes back the applied-offer set.

use super::AppliedOffer;
use serde::{Deserialize, Serialize};

/// Cart line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineItem {
    /// Product ID
    pub product_id: String,
    /// Product name snapshot (for display)
    pub name: String,
    /// Quantity (always >= 1; zero-quantity updates remove the line)
    pub quantity: i32,
    /// Unit list price
    pub unit_list_price: f64,
    /// Unit discounted price, if the product carries a catalog discount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_discounted_price: Option<f64>,
}

impl CartLineItem {
    /// The per-unit price the customer actually pays before offers:
    /// discounted if present, list otherwise
    pub fn effective_unit_price(&self) -> f64 {
        self.unit_discounted_price.unwrap_or(self.unit_list_price)
    }
}

/// Line item input for add/update operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    pub product_id: String,
    pub quantity: i32,
}

/// Cart entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub id: String,
    /// Absent for anonymous carts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    #[serde(default)]
    pub applied_offers: Vec<AppliedOffer>,
    /// Last mutation timestamp (Unix millis)
    pub updated_at: i64,
}

impl Cart {
    pub fn new(id: impl Into<String>, customer_id: Option<String>, now_ms: i64) -> Self {
        Self {
            id: id.into(),
            customer_id,
            items: Vec::new(),
            applied_offers: Vec::new(),
            updated_at: now_ms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The single manually-selected applied offer, if any.
    ///
    /// At most one manual offer exists per cart at any time; the selector
    /// enforces this on every mutation.
    pub fn manual_offer(&self) -> Option<&AppliedOffer> {
        self.applied_offers.iter().find(|a| !a.auto_apply)
    }

    /// Find an applied offer by offer id
    pub fn find_applied(&self, offer_id: &str) -> Option<&AppliedOffer> {
        self.applied_offers.iter().find(|a| a.offer_id == offer_id)
    }

    /// Find a line item by product id
    pub fn find_item(&self, product_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Total quantity of a single product across line items
    pub fn quantity_of(&self, product_id: &str) -> i32 {
        self.items
            .iter()
            .filter(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: &str, quantity: i32, list: f64, discounted: Option<f64>) -> CartLineItem {
        CartLineItem {
            product_id: product_id.to_string(),
            name: product_id.to_string(),
            quantity,
            unit_list_price: list,
            unit_discounted_price: discounted,
        }
    }

    #[test]
    fn test_effective_unit_price() {
        assert_eq!(item("p1", 1, 100.0, Some(90.0)).effective_unit_price(), 90.0);
        assert_eq!(item("p1", 1, 100.0, None).effective_unit_price(), 100.0);
    }

    #[test]
    fn test_manual_offer_lookup() {
        let mut cart = Cart::new("cart-1", None, 0);
        assert!(cart.manual_offer().is_none());

        cart.applied_offers.push(AppliedOffer {
            offer_id: "o-auto".to_string(),
            code: "AUTO".to_string(),
            name: "Auto".to_string(),
            discount_amount: 5.0,
            auto_apply: true,
            applied_at: 0,
        });
        assert!(cart.manual_offer().is_none());

        cart.applied_offers.push(AppliedOffer {
            offer_id: "o-manual".to_string(),
            code: "MANUAL".to_string(),
            name: "Manual".to_string(),
            discount_amount: 10.0,
            auto_apply: false,
            applied_at: 0,
        });
        assert_eq!(cart.manual_offer().unwrap().offer_id, "o-manual");
    }

    #[test]
    fn test_quantity_of_sums_duplicate_lines() {
        let mut cart = Cart::new("cart-1", None, 0);
        cart.items.push(item("p1", 2, 10.0, None));
        cart.items.push(item("p2", 1, 5.0, None));
        cart.items.push(item("p1", 3, 10.0, None));
        assert_eq!(cart.quantity_of("p1"), 5);
        assert_eq!(cart.quantity_of("p2"), 1);
        assert_eq!(cart.quantity_of("p3"), 0);
    }
}
