//! Error type and result alias

use super::codes::ErrorCode;
use super::reason::RejectionReason;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Result alias for engine operations
pub type AppResult<T> = Result<T, AppError>;

/// Application error with structured error code and details
///
/// The primary error type for the engine, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details (rejection reasons, offending fields, ...)
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create an invalid request error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a cart-not-found error
    pub fn cart_not_found(cart_id: impl Into<String>) -> Self {
        let id = cart_id.into();
        Self::with_message(ErrorCode::CartNotFound, format!("Cart {} not found", id))
            .with_detail("cart_id", id)
    }

    /// Create an empty-cart error
    pub fn empty_cart() -> Self {
        Self::new(ErrorCode::EmptyCart)
    }

    /// Create an offer-not-found error
    pub fn offer_not_found(reference: impl Into<String>) -> Self {
        let r = reference.into();
        Self::with_message(ErrorCode::OfferNotFound, format!("Offer {} not found", r))
            .with_detail("offer", r)
    }

    /// Create an offer-not-eligible error carrying the rejection reason
    pub fn not_eligible(reason: RejectionReason) -> Self {
        Self::with_message(ErrorCode::OfferNotEligible, reason.message())
            .with_detail("reason", reason.as_code())
    }

    /// Create a collaborator-unavailable error (transient, caller may retry)
    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::CollaboratorUnavailable, msg)
    }

    /// The rejection reason attached via [`AppError::not_eligible`], if any
    pub fn rejection_reason(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|d| d.get("reason"))
            .and_then(|v| v.as_str())
    }
}
