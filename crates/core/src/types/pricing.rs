//! Tagged product pricing.
//!
//! The backend exposes pricing as three loosely coupled fields (`price`,
//! `finalPrice`, `discount.percentage`); a product with no usable price is
//! rendered as "contact for price". Modeling this as a tagged variant keeps
//! the null-checks in one place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error constructing a [`Pricing`] from wire fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A discount was advertised but the discounted amount is missing.
    #[error("discount of {percentage}% has no final price")]
    MissingFinalPrice { percentage: u32 },

    /// The discounted amount exceeds the original.
    #[error("final price {final_price} exceeds original {original}")]
    InvertedDiscount {
        original: Decimal,
        final_price: Decimal,
    },
}

/// Product pricing as displayed to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pricing {
    /// No usable price; the customer is asked to contact the shop.
    Contact,
    /// A single undiscounted amount.
    Plain { amount: Decimal },
    /// A running discount: strike-through original plus payable amount.
    Discounted {
        original: Decimal,
        final_price: Decimal,
        percentage: u32,
    },
}

impl Pricing {
    /// Build pricing from the backend's loose field triple.
    ///
    /// A missing or non-positive `price` means contact-for-price. A present
    /// discount percentage requires a `final_price` no greater than the
    /// original.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError`] if the discount fields are inconsistent.
    pub fn from_parts(
        price: Option<Decimal>,
        final_price: Option<Decimal>,
        percentage: Option<u32>,
    ) -> Result<Self, PricingError> {
        let Some(original) = price.filter(|p| p.is_sign_positive() && !p.is_zero()) else {
            return Ok(Self::Contact);
        };

        let Some(percentage) = percentage else {
            return Ok(Self::Plain { amount: original });
        };

        let final_price =
            final_price.ok_or(PricingError::MissingFinalPrice { percentage })?;
        if final_price > original {
            return Err(PricingError::InvertedDiscount {
                original,
                final_price,
            });
        }

        Ok(Self::Discounted {
            original,
            final_price,
            percentage,
        })
    }

    /// The amount the customer actually pays, if the product is purchasable.
    #[must_use]
    pub const fn effective(&self) -> Option<Decimal> {
        match self {
            Self::Contact => None,
            Self::Plain { amount } => Some(*amount),
            Self::Discounted { final_price, .. } => Some(*final_price),
        }
    }

    /// Whether a discount badge should be shown.
    #[must_use]
    pub const fn is_discounted(&self) -> bool {
        matches!(self, Self::Discounted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_missing_price_is_contact() {
        assert_eq!(Pricing::from_parts(None, None, None), Ok(Pricing::Contact));
        assert_eq!(
            Pricing::from_parts(Some(dec(0)), None, None),
            Ok(Pricing::Contact)
        );
    }

    #[test]
    fn test_plain_price() {
        let pricing = Pricing::from_parts(Some(dec(150_000)), None, None).expect("plain");
        assert_eq!(pricing, Pricing::Plain { amount: dec(150_000) });
        assert_eq!(pricing.effective(), Some(dec(150_000)));
        assert!(!pricing.is_discounted());
    }

    #[test]
    fn test_discounted_price() {
        let pricing = Pricing::from_parts(Some(dec(200_000)), Some(dec(160_000)), Some(20))
            .expect("discounted");
        assert_eq!(pricing.effective(), Some(dec(160_000)));
        assert!(pricing.is_discounted());
    }

    #[test]
    fn test_discount_without_final_price_is_error() {
        let err = Pricing::from_parts(Some(dec(200_000)), None, Some(20)).unwrap_err();
        assert_eq!(err, PricingError::MissingFinalPrice { percentage: 20 });
    }

    #[test]
    fn test_inverted_discount_is_error() {
        let err =
            Pricing::from_parts(Some(dec(100)), Some(dec(150)), Some(10)).unwrap_err();
        assert!(matches!(err, PricingError::InvertedDiscount { .. }));
    }
}
