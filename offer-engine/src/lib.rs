//! Promotional offer and cart pricing engine
//!
//! The engine owns three concerns:
//! - the offer/product catalog ([`catalog`])
//! - eligibility, discount calculation, and cart totals ([`pricing`])
//! - the applied-offer selector and the cart operation surface
//!   ([`selector`], [`engine`])
//!
//! All money flows through [`money`]: `f64` at the edges, `Decimal` inside.

pub mod catalog;
pub mod engine;
pub mod money;
pub mod pricing;
pub mod selector;

pub use catalog::{CatalogService, CatalogSnapshot, ProductMeta};
pub use engine::{
    AutoApplyOutcome, ComboCheck, CustomerHistory, InMemoryCustomerHistory, OfferEngine,
    PricedCart,
};
pub use selector::{ManualApplyOutcome, RecomputeOutcome};
