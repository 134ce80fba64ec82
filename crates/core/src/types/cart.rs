//! Cart lines and cart arithmetic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::catalog::ProductSummary;
use crate::types::id::{CartLineId, ProductId};

/// Default upper bound for a single line's quantity.
pub const DEFAULT_MAX_LINE_QUANTITY: u32 = 99;

/// One line of a customer's cart.
///
/// `unit_price` is snapshotted when the line is added; later catalog price
/// changes do not move existing lines. `created_at` keeps the listing in
/// stable insertion order regardless of how the server happens to sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub product: ProductSummary,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    /// Price of this line (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Sum of all line totals.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i32, quantity: u32, unit_price: i64) -> CartLine {
        CartLine {
            id: CartLineId::new(id),
            product_id: ProductId::new(id * 10),
            product: ProductSummary {
                id: ProductId::new(id * 10),
                name: format!("product {id}"),
                image: None,
            },
            quantity,
            unit_price: Decimal::from(unit_price),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line(1, 3, 50_000).line_total(), Decimal::from(150_000));
    }

    #[test]
    fn test_cart_total() {
        let lines = vec![line(1, 2, 100), line(2, 1, 50)];
        assert_eq!(cart_total(&lines), Decimal::from(250));
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }
}
