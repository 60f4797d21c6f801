//! Domain models

pub mod category;
pub mod customer;
pub mod offer;
pub mod product;

pub use category::Category;
pub use customer::CustomerContext;
pub use offer::{Offer, OfferCreate, OfferKind, OfferUpdate};
pub use product::{Product, ProductCreate};
