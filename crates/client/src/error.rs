//! Unified error type for API and sync operations.
//!
//! Recoverable errors (fetch/mutation failures) additionally surface through
//! the notice channel; validation and authentication errors are returned
//! inline and never produce a notice.

use phutung_core::{ContactError, PricingError, ShippingError};
use thiserror::Error;

/// Errors from the storefront API client and the sync layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection, timeout, non-success status).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON for the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response envelope reported `success: false`.
    #[error("API error: {0}")]
    Api(String),

    /// A field the client depends on was absent from the response.
    #[error("{resource} response missing required field `{field}`")]
    MissingField {
        resource: &'static str,
        field: &'static str,
    },

    /// Pricing fields in a response were inconsistent.
    #[error("invalid pricing: {0}")]
    Pricing(#[from] PricingError),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A mutation was attempted without a logged-in user.
    #[error("not authenticated")]
    Unauthenticated,

    /// Requested line quantity is outside the allowed range.
    #[error("quantity {quantity} outside allowed range 1..={max}")]
    QuantityOutOfRange { quantity: u32, max: u32 },

    /// The product has no purchasable price ("contact for price").
    #[error("product is not purchasable")]
    NotPurchasable,

    /// Checkout attempted with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Shipping form validation failed.
    #[error(transparent)]
    Shipping(#[from] ShippingError),

    /// Contact form validation failed.
    #[error(transparent)]
    Contact(#[from] ContactError),

    /// A URL in configuration or a response could not be parsed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Client-side validation failures: surfaced inline next to the form
    /// field, never sent to the server, never turned into a notice.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Shipping(_) | Self::Contact(_) | Self::QuantityOutOfRange { .. }
        )
    }

    /// Whether the caller should redirect to the authentication entry point.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

/// Result type alias for [`ApiError`].
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ApiError::MissingField {
            resource: "product",
            field: "id",
        };
        assert_eq!(
            err.to_string(),
            "product response missing required field `id`"
        );

        let err = ApiError::QuantityOutOfRange {
            quantity: 120,
            max: 99,
        };
        assert_eq!(err.to_string(), "quantity 120 outside allowed range 1..=99");
    }

    #[test]
    fn test_validation_classification() {
        assert!(
            ApiError::QuantityOutOfRange {
                quantity: 0,
                max: 99
            }
            .is_validation()
        );
        assert!(ApiError::Shipping(ShippingError::MissingPhone).is_validation());
        assert!(!ApiError::Api("boom".to_string()).is_validation());
        assert!(!ApiError::Unauthenticated.is_validation());
        assert!(ApiError::Unauthenticated.is_unauthenticated());
    }
}
