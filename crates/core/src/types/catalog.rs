//! Catalog entities: products and categories.
//!
//! These are domain types, separate from the raw wire DTOs the client crate
//! deserializes. Entities are only ever constructed from server responses.

use serde::{Deserialize, Serialize};

use crate::types::id::{CategoryId, ProductId};
use crate::types::pricing::Pricing;

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// URL slug used for detail lookups (`GET /products/{slug}`).
    pub slug: String,
    pub image: Option<String>,
    pub pricing: Pricing,
    /// Category name, when the listing endpoint includes it.
    pub category: Option<String>,
    /// Shown in the featured carousel on the home page.
    pub featured: bool,
}

impl Product {
    /// Lightweight reference carried on cart lines and order items.
    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
        }
    }
}

/// The subset of product data embedded in cart lines and order items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub image: Option<String>,
}

/// A product category, optionally with its products embedded
/// (`GET /categories/with-products`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub products: Vec<Product>,
}
