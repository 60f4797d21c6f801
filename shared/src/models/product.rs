//! Product Model
//!
//! Catalog view consumed by the engine: category membership and current
//! list/discounted prices. Storage is owned by the external catalog
//! collaborator.

use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Category reference (required)
    pub category_id: String,
    /// Current list price
    pub list_price: f64,
    /// Current discounted price, if the product carries a catalog discount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<f64>,
    pub is_active: bool,
}

impl Product {
    /// The price a cart line item pays per unit: discounted if present,
    /// list otherwise
    pub fn effective_price(&self) -> f64 {
        self.discounted_price.unwrap_or(self.list_price)
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub category_id: String,
    pub list_price: f64,
    pub discounted_price: Option<f64>,
}
