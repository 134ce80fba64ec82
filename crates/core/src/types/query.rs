//! The product query value object.
//!
//! A `ProductQuery` is immutable: field setters return a new value. Two
//! queries are equal iff all fields compare equal, and that equality is what
//! gates a refetch - the client never re-issues a request for an unchanged
//! query.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound of the default price range filter, in VND.
pub const DEFAULT_PRICE_CEILING: i64 = 10_000_000;

/// Committed product listing filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Free-text search keyword (debounced upstream).
    pub keyword: String,
    /// Selected category names; empty means all categories.
    pub categories: BTreeSet<String>,
    /// Inclusive `(min, max)` price bounds.
    pub price_range: (Decimal, Decimal),
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            categories: BTreeSet::new(),
            price_range: (Decimal::ZERO, Decimal::from(DEFAULT_PRICE_CEILING)),
        }
    }
}

impl ProductQuery {
    /// Replace the keyword, trimming surrounding whitespace.
    #[must_use]
    pub fn with_keyword(mut self, keyword: &str) -> Self {
        keyword.trim().clone_into(&mut self.keyword);
        self
    }

    /// Replace the category selection.
    #[must_use]
    pub fn with_categories<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the price bounds. Swaps them if given in reverse order.
    #[must_use]
    pub fn with_price_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.price_range = if min <= max { (min, max) } else { (max, min) };
        self
    }

    /// Comma-joined category list for the `categories` query parameter.
    #[must_use]
    pub fn categories_param(&self) -> String {
        self.categories
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_gates_refetch() {
        let a = ProductQuery::default().with_keyword("lốp");
        let b = ProductQuery::default().with_keyword("lốp");
        assert_eq!(a, b);

        let c = b.clone().with_categories(["Lốp xe"]);
        assert_ne!(b, c);
    }

    #[test]
    fn test_keyword_trimmed() {
        let q = ProductQuery::default().with_keyword("  nhông sên  ");
        assert_eq!(q.keyword, "nhông sên");
    }

    #[test]
    fn test_price_range_normalized() {
        let q = ProductQuery::default().with_price_range(Decimal::from(500), Decimal::from(100));
        assert_eq!(q.price_range, (Decimal::from(100), Decimal::from(500)));
    }

    #[test]
    fn test_categories_param_comma_joined_sorted() {
        let q = ProductQuery::default().with_categories(["Nhớt", "Lốp xe"]);
        assert_eq!(q.categories_param(), "Lốp xe,Nhớt");
    }

    #[test]
    fn test_default_range() {
        let q = ProductQuery::default();
        assert_eq!(
            q.price_range,
            (Decimal::ZERO, Decimal::from(10_000_000_i64))
        );
    }
}
