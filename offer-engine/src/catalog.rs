//! Offer Catalog Service - offer, product, and category management with
//! in-memory maps
//!
//! Read-mostly: evaluations take an immutable [`CatalogSnapshot`] per pass,
//! the admin write path mutates behind `RwLock`s. Deactivation is visible to
//! the next snapshot immediately; the engine layer additionally evicts a
//! revoked offer from every cart holding it.

use parking_lot::RwLock;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Category, Offer, OfferCreate, OfferUpdate, Product, ProductCreate};
use shared::models::offer::validate_kind;
use std::collections::HashMap;

// =============================================================================
// Types
// =============================================================================

/// Product metadata for scope matching and discount calculation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductMeta {
    pub category_id: String,
    pub list_price: f64,
    pub discounted_price: Option<f64>,
}

impl ProductMeta {
    pub fn effective_price(&self) -> f64 {
        self.discounted_price.unwrap_or(self.list_price)
    }
}

/// Immutable view of the catalog taken at the start of one evaluation pass.
///
/// Offers are sorted by id so repeated passes over an unchanged cart visit
/// them in the same order and produce identical results.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub offers: Vec<Offer>,
    pub product_meta: HashMap<String, ProductMeta>,
}

impl CatalogSnapshot {
    pub fn meta(&self, product_id: &str) -> Option<&ProductMeta> {
        self.product_meta.get(product_id)
    }

    pub fn offer(&self, offer_id: &str) -> Option<&Offer> {
        self.offers.iter().find(|o| o.id == offer_id)
    }
}

// =============================================================================
// CatalogService
// =============================================================================

/// Unified catalog service for offers, products, and categories
pub struct CatalogService {
    /// Offers: offer id -> Offer
    offers: RwLock<HashMap<String, Offer>>,
    /// Redemption code index: normalized code -> offer id
    codes: RwLock<HashMap<String, String>>,
    /// Products: product id -> Product
    products: RwLock<HashMap<String, Product>>,
    /// Categories: category id -> Category
    categories: RwLock<HashMap<String, Category>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("offers_count", &self.offers.read().len())
            .field("products_count", &self.products.read().len())
            .field("categories_count", &self.categories.read().len())
            .finish()
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogService {
    pub fn new() -> Self {
        Self {
            offers: RwLock::new(HashMap::new()),
            codes: RwLock::new(HashMap::new()),
            products: RwLock::new(HashMap::new()),
            categories: RwLock::new(HashMap::new()),
        }
    }

    // =========================================================================
    // Offer authoring (admin write path)
    // =========================================================================

    /// Create an offer. Validates the payload, normalizes the redemption
    /// code, and rejects duplicate codes.
    pub fn create_offer(&self, payload: OfferCreate, now_ms: i64) -> AppResult<Offer> {
        payload.validate_payload()?;

        let code = Offer::normalize_code(&payload.code);
        let offer = Offer {
            id: uuid::Uuid::new_v4().to_string(),
            name: payload.name,
            code: code.clone(),
            kind: payload.kind,
            product_ids: payload.product_ids,
            category_ids: payload.category_ids,
            min_order_value: payload.min_order_value,
            max_discount_cap: payload.max_discount_cap,
            starts_at: payload.starts_at,
            ends_at: payload.ends_at,
            is_active: true,
            auto_apply: payload.auto_apply,
            first_time_only: payload.first_time_only,
            badge_text: payload.badge_text,
            description: payload.description,
            usage_count: 0,
            created_at: now_ms,
        };

        // Uniqueness check and index insert happen under one write lock so
        // two racing creates cannot both claim the code. Lock order is
        // offers then codes, same as the update and delete paths.
        let mut offers = self.offers.write();
        let mut codes = self.codes.write();
        if codes.contains_key(&code) {
            return Err(AppError::with_message(
                ErrorCode::OfferCodeTaken,
                format!("Redemption code {} is already in use", code),
            )
            .with_detail("code", code.clone()));
        }
        offers.insert(offer.id.clone(), offer.clone());
        codes.insert(code, offer.id.clone());
        drop(codes);
        drop(offers);

        tracing::info!(offer_id = %offer.id, code = %offer.code, "offer created");
        Ok(offer)
    }

    /// Update an offer. `None` fields are left unchanged; the merged result
    /// is re-validated before it replaces the stored entry.
    pub fn update_offer(&self, offer_id: &str, update: OfferUpdate) -> AppResult<Offer> {
        let mut offers = self.offers.write();
        let current = offers
            .get(offer_id)
            .ok_or_else(|| AppError::offer_not_found(offer_id))?;
        let mut updated = current.clone();

        if let Some(name) = update.name {
            updated.name = name;
        }
        if let Some(code) = update.code {
            let normalized = Offer::normalize_code(&code);
            let codes = self.codes.read();
            if let Some(holder) = codes.get(&normalized)
                && holder != offer_id
            {
                return Err(AppError::with_message(
                    ErrorCode::OfferCodeTaken,
                    format!("Redemption code {} is already in use", normalized),
                ));
            }
            drop(codes);
            updated.code = normalized;
        }
        if let Some(kind) = update.kind {
            updated.kind = kind;
        }
        if let Some(product_ids) = update.product_ids {
            updated.product_ids = product_ids;
        }
        if let Some(category_ids) = update.category_ids {
            updated.category_ids = category_ids;
        }
        if let Some(min_order_value) = update.min_order_value {
            if !min_order_value.is_finite() || min_order_value < 0.0 {
                return Err(AppError::validation("min_order_value must be non-negative"));
            }
            updated.min_order_value = min_order_value;
        }
        if let Some(cap) = update.max_discount_cap {
            if let Some(value) = cap
                && (!value.is_finite() || value < 0.0)
            {
                return Err(AppError::validation("max_discount_cap must be non-negative"));
            }
            updated.max_discount_cap = cap;
        }
        if let Some(starts_at) = update.starts_at {
            updated.starts_at = starts_at;
        }
        if let Some(ends_at) = update.ends_at {
            updated.ends_at = ends_at;
        }
        if let Some(is_active) = update.is_active {
            updated.is_active = is_active;
        }
        if let Some(auto_apply) = update.auto_apply {
            updated.auto_apply = auto_apply;
        }
        if let Some(first_time_only) = update.first_time_only {
            updated.first_time_only = first_time_only;
        }
        if let Some(badge_text) = update.badge_text {
            updated.badge_text = badge_text;
        }
        if let Some(description) = update.description {
            updated.description = description;
        }

        if updated.starts_at >= updated.ends_at {
            return Err(AppError::validation("starts_at must be before ends_at"));
        }
        validate_kind(&updated.kind, &updated.category_ids)?;

        if updated.code != current.code {
            let mut codes = self.codes.write();
            codes.remove(&current.code);
            codes.insert(updated.code.clone(), offer_id.to_string());
        }
        offers.insert(offer_id.to_string(), updated.clone());
        Ok(updated)
    }

    /// Deactivate an offer (the catalog half of a revocation; the engine
    /// evicts it from carts synchronously).
    pub fn deactivate_offer(&self, offer_id: &str) -> AppResult<Offer> {
        let mut offers = self.offers.write();
        let offer = offers
            .get_mut(offer_id)
            .ok_or_else(|| AppError::offer_not_found(offer_id))?;
        offer.is_active = false;
        tracing::info!(offer_id = %offer_id, "offer deactivated");
        Ok(offer.clone())
    }

    /// Delete an offer from the catalog. Order-time discount records are
    /// frozen snapshots, so historical orders are unaffected; carts still
    /// holding the offer drop it on their next recomputation.
    pub fn delete_offer(&self, offer_id: &str) -> AppResult<()> {
        let mut offers = self.offers.write();
        let offer = offers
            .remove(offer_id)
            .ok_or_else(|| AppError::offer_not_found(offer_id))?;
        self.codes.write().remove(&offer.code);
        Ok(())
    }

    /// Increment the usage counter (called when an order completes while the
    /// offer is applied). Monotonic; never decremented here.
    pub fn record_redemption(&self, offer_id: &str) {
        let mut offers = self.offers.write();
        if let Some(offer) = offers.get_mut(offer_id) {
            offer.usage_count += 1;
        } else {
            tracing::warn!(offer_id = %offer_id, "redemption recorded for unknown offer");
        }
    }

    // =========================================================================
    // Offer lookup
    // =========================================================================

    pub fn get_offer(&self, offer_id: &str) -> Option<Offer> {
        self.offers.read().get(offer_id).cloned()
    }

    /// Case-insensitive code lookup
    pub fn get_offer_by_code(&self, code: &str) -> Option<Offer> {
        let normalized = Offer::normalize_code(code);
        let codes = self.codes.read();
        let offer_id = codes.get(&normalized)?;
        self.offers.read().get(offer_id).cloned()
    }

    /// Resolve an offer by id first, then by redemption code
    pub fn resolve_offer(&self, reference: &str) -> Option<Offer> {
        self.get_offer(reference)
            .or_else(|| self.get_offer_by_code(reference))
    }

    pub fn list_offers(&self) -> Vec<Offer> {
        let mut offers: Vec<Offer> = self.offers.read().values().cloned().collect();
        offers.sort_by(|a, b| a.id.cmp(&b.id));
        offers
    }

    /// Take an immutable snapshot for one evaluation pass
    pub fn snapshot(&self) -> CatalogSnapshot {
        let mut offers: Vec<Offer> = self.offers.read().values().cloned().collect();
        offers.sort_by(|a, b| a.id.cmp(&b.id));

        let product_meta = self
            .products
            .read()
            .iter()
            .map(|(id, p)| {
                (
                    id.clone(),
                    ProductMeta {
                        category_id: p.category_id.clone(),
                        list_price: p.list_price,
                        discounted_price: p.discounted_price,
                    },
                )
            })
            .collect();

        CatalogSnapshot {
            offers,
            product_meta,
        }
    }

    // =========================================================================
    // Products and categories
    // =========================================================================

    pub fn create_product(&self, payload: ProductCreate) -> AppResult<Product> {
        if !payload.list_price.is_finite() || payload.list_price < 0.0 {
            return Err(AppError::validation("list_price must be non-negative"));
        }
        if let Some(dp) = payload.discounted_price
            && (!dp.is_finite() || dp < 0.0 || dp > payload.list_price)
        {
            return Err(AppError::validation(
                "discounted_price must be between 0 and the list price",
            ));
        }
        if !self.categories.read().contains_key(&payload.category_id) {
            return Err(AppError::not_found(format!("category {}", payload.category_id)));
        }

        let product = Product {
            id: uuid::Uuid::new_v4().to_string(),
            name: payload.name,
            category_id: payload.category_id,
            list_price: payload.list_price,
            discounted_price: payload.discounted_price,
            is_active: true,
        };
        self.products
            .write()
            .insert(product.id.clone(), product.clone());
        Ok(product)
    }

    /// Insert or replace a product with a caller-chosen id (seed/sync path)
    pub fn upsert_product(&self, product: Product) {
        self.products.write().insert(product.id.clone(), product);
    }

    pub fn get_product(&self, product_id: &str) -> Option<Product> {
        self.products.read().get(product_id).cloned()
    }

    pub fn upsert_category(&self, category: Category) {
        self.categories
            .write()
            .insert(category.id.clone(), category);
    }

    pub fn get_category(&self, category_id: &str) -> Option<Category> {
        self.categories.read().get(category_id).cloned()
    }
}
