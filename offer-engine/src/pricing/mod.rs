//! Pricing pipeline: scope matching, eligibility evaluation, discount
//! calculation, and cart totals.

pub mod calculator;
pub mod eligibility;
pub mod matcher;
pub mod pipeline;
