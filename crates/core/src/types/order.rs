//! Orders, order history, and the checkout draft.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::cart::CartLine;
use crate::types::catalog::ProductSummary;
use crate::types::id::{OrderId, ProductId, UserId};
use crate::types::status::{OrderStatus, PaymentMethod};

/// A placed order as returned by `GET /orders/user/{id}/details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: ProductSummary,
    pub quantity: u32,
    pub price: Decimal,
}

/// Shipping details collected at checkout; validated before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub full_name: String,
    pub phone: String,
    pub address: String,
}

/// Inline validation failure for [`ShippingDetails`]. Never sent to the
/// server and never surfaced as a transient notice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShippingError {
    #[error("full name is required")]
    MissingName,
    #[error("phone number is required")]
    MissingPhone,
    #[error("shipping address is required")]
    MissingAddress,
}

impl ShippingDetails {
    /// Check that all required fields are non-blank.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    pub fn validate(&self) -> Result<(), ShippingError> {
        if self.full_name.trim().is_empty() {
            return Err(ShippingError::MissingName);
        }
        if self.phone.trim().is_empty() {
            return Err(ShippingError::MissingPhone);
        }
        if self.address.trim().is_empty() {
            return Err(ShippingError::MissingAddress);
        }
        Ok(())
    }
}

/// Payload for `POST /orders`, built from the current cart snapshot.
///
/// Wire keys mirror the backend contract exactly; note that it mixes
/// camelCase and snake_case (`shipping_address`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDraft {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub items: Vec<OrderDraftItem>,
    #[serde(rename = "totalPrice")]
    pub total_price: Decimal,
    pub note: String,
    pub shipping_address: String,
    #[serde(rename = "paymentMethod")]
    pub payment_method: PaymentMethod,
}

/// One cart line flattened into the order payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDraftItem {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderDraft {
    /// Build a draft from cart lines, validating shipping details first.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingError`] if a required shipping field is blank.
    pub fn from_cart(
        user_id: UserId,
        lines: &[CartLine],
        shipping: &ShippingDetails,
        payment_method: PaymentMethod,
        note: Option<String>,
    ) -> Result<Self, ShippingError> {
        shipping.validate()?;

        let items = lines
            .iter()
            .map(|line| OrderDraftItem {
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.unit_price,
            })
            .collect();

        Ok(Self {
            user_id,
            items,
            total_price: crate::types::cart::cart_total(lines),
            note: note.unwrap_or_default(),
            shipping_address: shipping.address.trim().to_string(),
            payment_method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::id::CartLineId;

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            full_name: "Nguyễn Văn A".to_string(),
            phone: "0901234567".to_string(),
            address: "12 Lý Thường Kiệt, Q.10".to_string(),
        }
    }

    fn line(id: i32, quantity: u32, unit_price: i64) -> CartLine {
        CartLine {
            id: CartLineId::new(id),
            product_id: ProductId::new(id),
            product: ProductSummary {
                id: ProductId::new(id),
                name: "part".to_string(),
                image: None,
            },
            quantity,
            unit_price: Decimal::from(unit_price),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_draft_totals_and_items() {
        let lines = vec![line(1, 2, 100), line(2, 1, 50)];
        let draft =
            OrderDraft::from_cart(UserId::new(7), &lines, &shipping(), PaymentMethod::Cod, None)
                .expect("valid draft");

        assert_eq!(draft.total_price, Decimal::from(250));
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[0].quantity, 2);
        assert_eq!(draft.note, "");
    }

    #[test]
    fn test_blank_address_rejected() {
        let bad = ShippingDetails {
            address: "   ".to_string(),
            ..shipping()
        };
        let err = OrderDraft::from_cart(UserId::new(7), &[], &bad, PaymentMethod::Cod, None)
            .unwrap_err();
        assert_eq!(err, ShippingError::MissingAddress);
    }

    #[test]
    fn test_shipping_validation_order() {
        let blank = ShippingDetails {
            full_name: String::new(),
            phone: String::new(),
            address: String::new(),
        };
        assert_eq!(blank.validate(), Err(ShippingError::MissingName));
    }
}
