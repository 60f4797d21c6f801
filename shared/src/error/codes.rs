//! Unified error codes for the offer engine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Cart errors
//! - 6xxx: Offer errors
//! - 9xxx: System / collaborator errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Cart ====================
    /// Cart not found
    CartNotFound = 4001,
    /// Pricing or offer application attempted on a cart with zero items
    EmptyCart = 4002,
    /// Line item not found in cart
    ItemNotFound = 4003,

    // ==================== 6xxx: Offer ====================
    /// Referenced offer id/code does not exist in the catalog
    OfferNotFound = 6001,
    /// Manual apply requested for an offer already active on the cart
    OfferAlreadyApplied = 6002,
    /// Removal requested for an offer not currently on the cart
    OfferNotApplied = 6003,
    /// Offer failed an eligibility check (reason carried in details)
    OfferNotEligible = 6004,
    /// Redemption code already taken by another offer
    OfferCodeTaken = 6005,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9000,
    /// Catalog or customer-history lookup failed; evaluation aborted
    CollaboratorUnavailable = 9001,
}

impl ErrorCode {
    /// Get the default human-readable message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value out of range",
            ErrorCode::CartNotFound => "Cart not found",
            ErrorCode::EmptyCart => "Cart has no items",
            ErrorCode::ItemNotFound => "Line item not found in cart",
            ErrorCode::OfferNotFound => "Offer not found",
            ErrorCode::OfferAlreadyApplied => "Offer is already applied to this cart",
            ErrorCode::OfferNotApplied => "Offer is not applied to this cart",
            ErrorCode::OfferNotEligible => "Offer is not eligible for this cart",
            ErrorCode::OfferCodeTaken => "Redemption code is already in use",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::CollaboratorUnavailable => "Upstream lookup failed, evaluation aborted",
        }
    }

    /// Whether this code represents a transient collaborator failure that the
    /// caller may retry, as opposed to a business-rule outcome.
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorCode::CollaboratorUnavailable)
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code as u16
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),
            4001 => Ok(ErrorCode::CartNotFound),
            4002 => Ok(ErrorCode::EmptyCart),
            4003 => Ok(ErrorCode::ItemNotFound),
            6001 => Ok(ErrorCode::OfferNotFound),
            6002 => Ok(ErrorCode::OfferAlreadyApplied),
            6003 => Ok(ErrorCode::OfferNotApplied),
            6004 => Ok(ErrorCode::OfferNotEligible),
            6005 => Ok(ErrorCode::OfferCodeTaken),
            9000 => Ok(ErrorCode::InternalError),
            9001 => Ok(ErrorCode::CollaboratorUnavailable),
            _ => Err(format!("Unknown error code: {}", value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", *self as u16, self.message())
    }
}
