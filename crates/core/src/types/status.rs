//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The backend stores status strings in a mix of English keys and Vietnamese
/// display text depending on which admin tool wrote them, so parsing accepts
/// both. Unrecognized values are preserved verbatim rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipping,
    Completed,
    Cancelled,
    Unknown(String),
}

impl OrderStatus {
    /// Parse a raw backend status string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "pending" | "chờ xác nhận" => Self::Pending,
            "confirmed" | "đã xác nhận" => Self::Confirmed,
            "shipping" | "đang giao" => Self::Shipping,
            "paid" | "đã giao" | "thanh toán" | "thành công" => Self::Completed,
            "cancelled" | "đã hủy" => Self::Cancelled,
            _ => Self::Unknown(raw.trim().to_string()),
        }
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// External PayPal approval flow.
    Paypal,
}

impl PaymentMethod {
    /// Lowercase wire representation expected by `POST /orders`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Paypal => "paypal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_english_keys() {
        assert_eq!(OrderStatus::parse("pending"), OrderStatus::Pending);
        assert_eq!(OrderStatus::parse("SHIPPING"), OrderStatus::Shipping);
        assert_eq!(OrderStatus::parse("paid"), OrderStatus::Completed);
    }

    #[test]
    fn test_parse_vietnamese_synonyms() {
        assert_eq!(OrderStatus::parse("Chờ xác nhận"), OrderStatus::Pending);
        assert_eq!(OrderStatus::parse("đang giao"), OrderStatus::Shipping);
        assert_eq!(OrderStatus::parse("Đã hủy"), OrderStatus::Cancelled);
    }

    #[test]
    fn test_parse_unknown_preserved() {
        assert_eq!(
            OrderStatus::parse(" refunded "),
            OrderStatus::Unknown("refunded".to_string())
        );
    }

    #[test]
    fn test_payment_method_wire_form() {
        assert_eq!(PaymentMethod::Cod.as_str(), "cod");
        assert_eq!(PaymentMethod::Paypal.as_str(), "paypal");
    }
}
