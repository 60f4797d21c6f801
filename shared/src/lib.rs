//! Shared types for the offer engine
//!
//! Domain models, cart types, applied-offer records, and the unified error
//! system used across the workspace.

pub mod cart;
pub mod error;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use cart::{AppliedOffer, Cart, CartLineItem, CartTotals, LineItemInput};
pub use error::{AppError, AppResult, ErrorCode, RejectionReason};
pub use models::{Category, CustomerContext, Offer, OfferCreate, OfferKind, OfferUpdate, Product};
