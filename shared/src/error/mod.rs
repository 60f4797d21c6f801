//! Unified error system for the offer engine
//!
//! This module provides:
//! - [`ErrorCode`]: standardized error codes for all failure types
//! - [`AppError`]: rich error type with codes, messages, and details
//! - [`RejectionReason`]: eligibility outcomes that are data, not faults
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Cart errors
//! - 6xxx: Offer errors
//! - 9xxx: System / collaborator errors
//!
//! Eligibility failures (`MIN_ORDER_NOT_MET`, `SCOPE_MISMATCH`, ...) are
//! expected, user-facing outcomes. They travel as [`RejectionReason`] values
//! inside successful results and never abort an evaluation. Collaborator
//! failures do abort, via [`ErrorCode::CollaboratorUnavailable`].

mod codes;
mod reason;
mod types;

pub use codes::ErrorCode;
pub use reason::RejectionReason;
pub use types::{AppError, AppResult};
