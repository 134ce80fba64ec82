//! Category endpoints, cached with a short TTL.
//!
//! Categories change rarely and are requested by every page, so both
//! variants are cached for five minutes. [`ApiClient::invalidate_categories`]
//! drops the cache early when staleness matters.

use std::sync::Arc;

use tracing::instrument;

use phutung_core::Category;

use crate::error::Result;

use super::wire::{into_categories, Envelope, RawCategory};
use super::ApiClient;

const KEY_PLAIN: &str = "categories";
const KEY_WITH_PRODUCTS: &str = "categories:with-products";

impl ApiClient {
    /// Fetch all categories (names only, no product rows).
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Arc<Vec<Category>>> {
        if let Some(cached) = self.category_cache().get(KEY_PLAIN).await {
            tracing::debug!("Category cache hit");
            return Ok(cached);
        }

        let categories = self.fetch_categories("categories").await?;
        self.category_cache()
            .insert(KEY_PLAIN.to_string(), Arc::clone(&categories))
            .await;
        Ok(categories)
    }

    /// Fetch categories with their product rows attached.
    #[instrument(skip(self))]
    pub async fn categories_with_products(&self) -> Result<Arc<Vec<Category>>> {
        if let Some(cached) = self.category_cache().get(KEY_WITH_PRODUCTS).await {
            tracing::debug!("Category cache hit");
            return Ok(cached);
        }

        let categories = self.fetch_categories("categories/with-products").await?;
        self.category_cache()
            .insert(KEY_WITH_PRODUCTS.to_string(), Arc::clone(&categories))
            .await;
        Ok(categories)
    }

    /// Drop any cached category data.
    pub async fn invalidate_categories(&self) {
        self.category_cache().invalidate_all();
    }

    async fn fetch_categories(&self, path: &str) -> Result<Arc<Vec<Category>>> {
        let url = self.endpoint(path)?;
        let response = self.http().get(url).send().await?;
        let envelope: Envelope<Vec<RawCategory>> = Self::decode(response, "categories").await?;
        into_categories(envelope.into_data("categories")?)
    }
}
