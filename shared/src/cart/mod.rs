//! Cart types: line items, applied offers, totals

mod applied_offer;
mod totals;
mod types;

pub use applied_offer::AppliedOffer;
pub use totals::CartTotals;
pub use types::{Cart, CartLineItem, LineItemInput};
