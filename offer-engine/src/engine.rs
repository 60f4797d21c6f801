//! Offer Engine - cart store and the operation surface tying catalog,
//! selector, and pricing together
//!
//! Carts live in a `DashMap`; every mutation recomputes the applied-offer
//! set against a fresh catalog snapshot before returning, so a cart read
//! back from the engine is always consistent with the catalog state it was
//! last touched under.

use crate::catalog::CatalogService;
use crate::money::validate_line_item;
use crate::pricing::{matcher, pipeline};
use crate::selector::{self, ManualApplyOutcome, RecomputeOutcome};
use dashmap::DashMap;
use serde::Serialize;
use shared::cart::{Cart, CartLineItem, CartTotals, LineItemInput};
use shared::error::{AppError, AppResult, ErrorCode, RejectionReason};
use shared::models::{CustomerContext, OfferKind};
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// Customer history
// =============================================================================

/// Lookup of a customer's prior completed orders.
///
/// A failing lookup aborts the operation rather than silently treating the
/// customer as a first-time buyer.
pub trait CustomerHistory: Send + Sync {
    fn has_completed_order(&self, customer_id: &str) -> AppResult<bool>;
}

/// In-memory history, fed by [`OfferEngine::record_order_completed`]
#[derive(Debug, Default)]
pub struct InMemoryCustomerHistory {
    completed: DashMap<String, u64>,
}

impl InMemoryCustomerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_completed(&self, customer_id: &str) {
        *self.completed.entry(customer_id.to_string()).or_insert(0) += 1;
    }
}

impl CustomerHistory for InMemoryCustomerHistory {
    fn has_completed_order(&self, customer_id: &str) -> AppResult<bool> {
        Ok(self.completed.contains_key(customer_id))
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Outcome of the auto-apply evaluation pass, for display layers
#[derive(Debug, Clone, Default, Serialize)]
pub struct AutoApplyOutcome {
    pub applied: Vec<shared::cart::AppliedOffer>,
    /// Offers that failed an eligibility check, keyed by offer id; covers
    /// manual candidates as well as auto-apply offers
    pub rejected: BTreeMap<String, RejectionReason>,
    /// Manual offer evicted during this pass, if any
    pub evicted_manual: Option<(String, RejectionReason)>,
    pub totals: CartTotals,
}

/// Combo bundle eligibility probe
#[derive(Debug, Clone, Serialize)]
pub struct ComboCheck {
    pub eligible: bool,
    /// Required products the cart is still missing
    pub missing_product_ids: Vec<String>,
}

/// Priced cart view
#[derive(Debug, Clone, Serialize)]
pub struct PricedCart {
    pub cart: Cart,
    pub totals: CartTotals,
}

// =============================================================================
// OfferEngine
// =============================================================================

pub struct OfferEngine {
    catalog: Arc<CatalogService>,
    customers: Arc<dyn CustomerHistory>,
    carts: DashMap<String, Cart>,
}

impl std::fmt::Debug for OfferEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfferEngine")
            .field("catalog", &self.catalog)
            .field("carts_count", &self.carts.len())
            .finish()
    }
}

impl OfferEngine {
    pub fn new(catalog: Arc<CatalogService>, customers: Arc<dyn CustomerHistory>) -> Self {
        Self {
            catalog,
            customers,
            carts: DashMap::new(),
        }
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Build the customer context for a cart. Anonymous carts evaluate as
    /// first-time buyers; a failing history lookup aborts the operation.
    fn customer_context(&self, cart: &Cart) -> AppResult<CustomerContext> {
        match &cart.customer_id {
            None => Ok(CustomerContext::anonymous()),
            Some(id) => {
                let has_completed_order =
                    self.customers.has_completed_order(id).map_err(|e| {
                        tracing::error!(customer_id = %id, error = %e, "customer history lookup failed");
                        AppError::collaborator("Customer history is unavailable")
                    })?;
                Ok(CustomerContext {
                    customer_id: Some(id.clone()),
                    has_completed_order,
                })
            }
        }
    }

    // =========================================================================
    // Cart lifecycle
    // =========================================================================

    pub fn create_cart(&self, customer_id: Option<String>) -> Cart {
        let cart = Cart::new(
            uuid::Uuid::new_v4().to_string(),
            customer_id,
            Self::now_ms(),
        );
        self.carts.insert(cart.id.clone(), cart.clone());
        tracing::info!(cart_id = %cart.id, "cart created");
        cart
    }

    pub fn get_cart(&self, cart_id: &str) -> AppResult<Cart> {
        self.carts
            .get(cart_id)
            .map(|c| c.clone())
            .ok_or_else(|| AppError::cart_not_found(cart_id))
    }

    /// Add a product to a cart, snapshotting its current catalog prices.
    /// Adding a product already in the cart merges quantities.
    pub fn add_item(&self, cart_id: &str, input: LineItemInput) -> AppResult<Cart> {
        if input.quantity < 1 {
            return Err(AppError::validation(format!(
                "quantity must be at least 1, got {}",
                input.quantity
            )));
        }
        let product = self
            .catalog
            .get_product(&input.product_id)
            .ok_or_else(|| AppError::not_found(format!("product {}", input.product_id)))?;
        if !product.is_active {
            return Err(AppError::invalid(format!(
                "Product {} is not available",
                product.id
            )));
        }

        let now_ms = Self::now_ms();
        let mut entry = self
            .carts
            .get_mut(cart_id)
            .ok_or_else(|| AppError::cart_not_found(cart_id))?;
        let cart = entry.value_mut();

        let merged_quantity = cart
            .quantity_of(&input.product_id)
            .checked_add(input.quantity)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "quantity exceeds maximum allowed, got {}",
                    input.quantity
                ))
            })?;
        let item = CartLineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity: merged_quantity,
            unit_list_price: product.list_price,
            unit_discounted_price: product.discounted_price,
        };
        validate_line_item(&item)?;

        if let Some(existing) = cart.items.iter_mut().find(|i| i.product_id == product.id) {
            existing.quantity = merged_quantity;
        } else {
            cart.items.push(item);
        }

        self.recompute_locked(cart, now_ms)?;
        Ok(cart.clone())
    }

    /// Set a line item's quantity. Zero removes the line.
    pub fn update_item_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> AppResult<Cart> {
        let now_ms = Self::now_ms();
        let mut entry = self
            .carts
            .get_mut(cart_id)
            .ok_or_else(|| AppError::cart_not_found(cart_id))?;
        let cart = entry.value_mut();

        let position = cart
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ItemNotFound,
                    format!("Product {} is not in the cart", product_id),
                )
            })?;

        if quantity <= 0 {
            cart.items.remove(position);
        } else {
            let mut item = cart.items[position].clone();
            item.quantity = quantity;
            validate_line_item(&item)?;
            cart.items[position] = item;
        }

        self.recompute_locked(cart, now_ms)?;
        Ok(cart.clone())
    }

    pub fn remove_item(&self, cart_id: &str, product_id: &str) -> AppResult<Cart> {
        self.update_item_quantity(cart_id, product_id, 0)
    }

    // =========================================================================
    // Offer application
    // =========================================================================

    /// Run the auto-apply evaluation pass and return the outcome with fresh
    /// totals.
    pub fn evaluate_and_apply_auto_offers(&self, cart_id: &str) -> AppResult<AutoApplyOutcome> {
        let now_ms = Self::now_ms();
        let mut entry = self
            .carts
            .get_mut(cart_id)
            .ok_or_else(|| AppError::cart_not_found(cart_id))?;
        let cart = entry.value_mut();

        let outcome = self.recompute_locked(cart, now_ms)?;
        Ok(AutoApplyOutcome {
            applied: outcome.applied,
            rejected: outcome.rejected,
            evicted_manual: outcome.evicted_manual,
            totals: pipeline::price(cart),
        })
    }

    /// Apply an offer by id or redemption code
    pub fn apply_manual_offer(
        &self,
        cart_id: &str,
        reference: &str,
    ) -> AppResult<ManualApplyOutcome> {
        let offer = self
            .catalog
            .resolve_offer(reference)
            .ok_or_else(|| AppError::offer_not_found(reference))?;

        let now_ms = Self::now_ms();
        let snapshot = self.catalog.snapshot();
        let mut entry = self
            .carts
            .get_mut(cart_id)
            .ok_or_else(|| AppError::cart_not_found(cart_id))?;
        let cart = entry.value_mut();
        let customer = self.customer_context(cart)?;

        selector::apply_manual(cart, &offer, &snapshot, &customer, now_ms)
    }

    /// Remove an applied offer from a cart
    pub fn remove_offer(&self, cart_id: &str, offer_id: &str) -> AppResult<Cart> {
        let now_ms = Self::now_ms();
        let mut entry = self
            .carts
            .get_mut(cart_id)
            .ok_or_else(|| AppError::cart_not_found(cart_id))?;
        let cart = entry.value_mut();

        selector::remove(cart, offer_id, now_ms)?;
        self.recompute_locked(cart, now_ms)?;
        Ok(cart.clone())
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Price a cart after a fresh recomputation pass
    pub fn price_cart(&self, cart_id: &str) -> AppResult<PricedCart> {
        let now_ms = Self::now_ms();
        let mut entry = self
            .carts
            .get_mut(cart_id)
            .ok_or_else(|| AppError::cart_not_found(cart_id))?;
        let cart = entry.value_mut();

        if cart.is_empty() {
            return Err(AppError::empty_cart().with_detail("cart_id", cart.id.clone()));
        }

        self.recompute_locked(cart, now_ms)?;
        Ok(PricedCart {
            totals: pipeline::price(cart),
            cart: cart.clone(),
        })
    }

    /// Probe a combo offer: which required products is the cart missing?
    pub fn check_combo_eligibility(&self, cart_id: &str, offer_id: &str) -> AppResult<ComboCheck> {
        let offer = self
            .catalog
            .get_offer(offer_id)
            .ok_or_else(|| AppError::offer_not_found(offer_id))?;
        if !matches!(offer.kind, OfferKind::ComboBundle { .. }) {
            return Err(AppError::invalid(format!(
                "Offer {} is not a combo bundle",
                offer.code
            )));
        }

        let cart = self.get_cart(cart_id)?;
        let missing_product_ids = matcher::combo_missing_products(&offer, &cart);
        Ok(ComboCheck {
            eligible: missing_product_ids.is_empty(),
            missing_product_ids,
        })
    }

    // =========================================================================
    // Catalog-side events
    // =========================================================================

    /// Deactivate an offer and synchronously evict it from every cart
    /// currently holding it. Returns the ids of the carts touched.
    pub fn revoke_offer(&self, offer_id: &str) -> AppResult<Vec<String>> {
        self.catalog.deactivate_offer(offer_id)?;

        let now_ms = Self::now_ms();
        let snapshot = self.catalog.snapshot();
        let mut touched = Vec::new();

        for mut entry in self.carts.iter_mut() {
            let cart = entry.value_mut();
            if cart.find_applied(offer_id).is_none() {
                continue;
            }
            let customer = self.customer_context(cart)?;
            selector::recompute(cart, &snapshot, &customer, now_ms);
            touched.push(cart.id.clone());
        }

        tracing::info!(offer_id = %offer_id, carts = touched.len(), "offer revoked and evicted");
        Ok(touched)
    }

    /// Record order completion for a cart: bump usage counters for every
    /// applied offer, mark the customer as returning, and drop the cart.
    pub fn record_order_completed(&self, cart_id: &str) -> AppResult<Cart> {
        let (_, cart) = self
            .carts
            .remove(cart_id)
            .ok_or_else(|| AppError::cart_not_found(cart_id))?;

        for applied in &cart.applied_offers {
            self.catalog.record_redemption(&applied.offer_id);
        }
        tracing::info!(
            cart_id = %cart_id,
            offers = cart.applied_offers.len(),
            "order completed, redemptions recorded"
        );
        Ok(cart)
    }

    fn recompute_locked(&self, cart: &mut Cart, now_ms: i64) -> AppResult<RecomputeOutcome> {
        let customer = self.customer_context(cart)?;
        let snapshot = self.catalog.snapshot();
        Ok(selector::recompute(cart, &snapshot, &customer, now_ms))
    }
}
