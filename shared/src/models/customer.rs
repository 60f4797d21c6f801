//! Customer context
//!
//! Explicit per-evaluation customer state. Passed into every evaluation call;
//! the engine never reads ambient session state.

use serde::{Deserialize, Serialize};

/// Customer context for one evaluation pass
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CustomerContext {
    /// Absent for anonymous/guest carts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Whether the customer has at least one prior completed order
    #[serde(default)]
    pub has_completed_order: bool,
}

impl CustomerContext {
    /// Anonymous customer: no history, treated as a first-time buyer
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn returning(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            has_completed_order: true,
        }
    }

    pub fn first_time(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            has_completed_order: false,
        }
    }
}
