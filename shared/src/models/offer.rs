//! Offer Model
//!
//! A promotional rule: kind, scope, magnitude, constraints, validity window.
//! The kind is a tagged union so each variant carries only the fields it
//! needs; required per-kind fields are validated at authoring time, never at
//! evaluation time.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Offer kind (closed set, mutually exclusive behavior)
///
/// `CategoryScoped` and `FirstPurchaseOnly` carry a percentage like
/// `PercentageDiscount` but add an extra eligibility predicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferKind {
    /// Percentage off the scoped subtotal
    PercentageDiscount { percent: f64 },
    /// Flat amount off, clamped to the scoped subtotal
    FlatAmountDiscount { amount: f64 },
    /// Percentage off, restricted to the offer's category set
    CategoryScoped { percent: f64 },
    /// Percentage off, restricted to customers with no completed orders
    FirstPurchaseOnly { percent: f64 },
    /// Buy `buy_quantity`, get `get_quantity` free
    BuyXGetY {
        buy_quantity: i32,
        get_quantity: i32,
        /// Designated free product; defaults to the cheapest qualifying one
        #[serde(skip_serializing_if = "Option::is_none")]
        free_product_id: Option<String>,
    },
    /// Fixed bundle price for a set of required products
    ComboBundle {
        product_ids: Vec<String>,
        bundle_price: f64,
    },
}

impl OfferKind {
    /// The percentage magnitude, for the three percentage-bearing kinds
    pub fn percent(&self) -> Option<f64> {
        match self {
            OfferKind::PercentageDiscount { percent }
            | OfferKind::CategoryScoped { percent }
            | OfferKind::FirstPurchaseOnly { percent } => Some(*percent),
            _ => None,
        }
    }

    /// Wire-format tag for this kind, e.g. `BUY_X_GET_Y`
    pub fn tag(&self) -> &'static str {
        match self {
            OfferKind::PercentageDiscount { .. } => "PERCENTAGE_DISCOUNT",
            OfferKind::FlatAmountDiscount { .. } => "FLAT_AMOUNT_DISCOUNT",
            OfferKind::CategoryScoped { .. } => "CATEGORY_SCOPED",
            OfferKind::FirstPurchaseOnly { .. } => "FIRST_PURCHASE_ONLY",
            OfferKind::BuyXGetY { .. } => "BUY_X_GET_Y",
            OfferKind::ComboBundle { .. } => "COMBO_BUNDLE",
        }
    }
}

/// Offer entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub id: String,
    pub name: String,
    /// Unique redemption code, uppercase-normalized
    pub code: String,
    #[serde(flatten)]
    pub kind: OfferKind,
    /// Explicit product scope; empty = no product restriction
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_ids: Vec<String>,
    /// Explicit category scope; empty = no category restriction
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<String>,
    /// Minimum order value (post-product-discount subtotal)
    #[serde(default)]
    pub min_order_value: f64,
    /// Optional upper bound on the computed discount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount_cap: Option<f64>,
    /// Validity window start (Unix millis, inclusive)
    pub starts_at: i64,
    /// Validity window end (Unix millis, exclusive)
    pub ends_at: i64,
    pub is_active: bool,
    /// Applied by the system without user action when eligible
    pub auto_apply: bool,
    /// Restricts to customers with zero prior completed orders,
    /// independent of kind
    #[serde(default)]
    pub first_time_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Times an order was placed while this offer was applied
    #[serde(default)]
    pub usage_count: u64,
    pub created_at: i64,
}

impl Offer {
    /// Normalize a redemption code: trimmed, uppercased
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Whether the offer restricts scope to explicit products or categories
    pub fn is_scoped(&self) -> bool {
        !self.product_ids.is_empty() || !self.category_ids.is_empty()
    }

    /// Whether eligibility requires a customer with no completed orders
    pub fn requires_first_purchase(&self) -> bool {
        self.first_time_only || matches!(self.kind, OfferKind::FirstPurchaseOnly { .. })
    }
}

/// Create offer payload (admin authoring path)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OfferCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 2, max = 32))]
    pub code: String,
    #[serde(flatten)]
    pub kind: OfferKind,
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub category_ids: Vec<String>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub min_order_value: f64,
    pub max_discount_cap: Option<f64>,
    pub starts_at: i64,
    pub ends_at: i64,
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(default)]
    pub first_time_only: bool,
    pub badge_text: Option<String>,
    pub description: Option<String>,
}

impl OfferCreate {
    /// Full authoring-time validation: field constraints plus per-kind rules.
    ///
    /// Evaluation code assumes these invariants hold and never re-checks them.
    pub fn validate_payload(&self) -> Result<(), AppError> {
        Validate::validate(self)
            .map_err(|e| AppError::validation(e.to_string()))?;

        if self.starts_at >= self.ends_at {
            return Err(AppError::validation("starts_at must be before ends_at")
                .with_detail("starts_at", self.starts_at)
                .with_detail("ends_at", self.ends_at));
        }

        if let Some(cap) = self.max_discount_cap
            && cap < 0.0
        {
            return Err(AppError::validation("max_discount_cap must be non-negative")
                .with_detail("max_discount_cap", cap));
        }

        validate_kind(&self.kind, &self.category_ids)
    }
}

/// Per-kind required-field validation, shared by create and update paths
pub fn validate_kind(kind: &OfferKind, category_ids: &[String]) -> Result<(), AppError> {
    match kind {
        OfferKind::PercentageDiscount { percent }
        | OfferKind::FirstPurchaseOnly { percent } => validate_percent(*percent),
        OfferKind::CategoryScoped { percent } => {
            validate_percent(*percent)?;
            if category_ids.is_empty() {
                return Err(AppError::validation(
                    "CATEGORY_SCOPED offers require a non-empty category set",
                ));
            }
            Ok(())
        }
        OfferKind::FlatAmountDiscount { amount } => {
            if !amount.is_finite() || *amount < 0.0 {
                return Err(AppError::validation("flat amount must be non-negative")
                    .with_detail("amount", *amount));
            }
            Ok(())
        }
        OfferKind::BuyXGetY {
            buy_quantity,
            get_quantity,
            ..
        } => {
            if *buy_quantity < 1 || *get_quantity < 1 {
                return Err(AppError::validation(
                    "buy_quantity and get_quantity must both be at least 1",
                )
                .with_detail("buy_quantity", *buy_quantity)
                .with_detail("get_quantity", *get_quantity));
            }
            Ok(())
        }
        OfferKind::ComboBundle {
            product_ids,
            bundle_price,
        } => {
            if product_ids.len() < 2 {
                return Err(AppError::validation(
                    "COMBO_BUNDLE offers require at least two products",
                ));
            }
            if !bundle_price.is_finite() || *bundle_price < 0.0 {
                return Err(AppError::validation("bundle_price must be non-negative")
                    .with_detail("bundle_price", *bundle_price));
            }
            Ok(())
        }
    }
}

fn validate_percent(percent: f64) -> Result<(), AppError> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(
            AppError::validation("percentage must be between 0 and 100")
                .with_detail("percent", percent),
        );
    }
    Ok(())
}

/// Update offer payload (admin authoring path)
///
/// `None` fields are left unchanged. Kind changes replace the whole variant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OfferUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub kind: Option<OfferKind>,
    pub product_ids: Option<Vec<String>>,
    pub category_ids: Option<Vec<String>>,
    pub min_order_value: Option<f64>,
    /// `Some(None)` clears the cap
    pub max_discount_cap: Option<Option<f64>>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub is_active: Option<bool>,
    pub auto_apply: Option<bool>,
    pub first_time_only: Option<bool>,
    pub badge_text: Option<Option<String>>,
    pub description: Option<Option<String>>,
}
