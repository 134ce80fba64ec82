//! Product catalog endpoints.

use serde::Serialize;
use tracing::instrument;

use phutung_core::{Product, ProductQuery};

use crate::error::{ApiError, Result};

use super::wire::{Envelope, RawProduct, RawProductList};
use super::ApiClient;

/// Offset/limit paging for product listings.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 12,
        }
    }
}

/// One page of a filtered product listing.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub rows: Vec<Product>,
    /// Total matching rows across all pages.
    pub count: u64,
}

impl ApiClient {
    /// Fetch products matching `query`, optionally paged.
    ///
    /// Only non-default filters are sent: an empty keyword, empty category
    /// set, or full-range price filter is omitted from the query string
    /// entirely.
    #[instrument(skip(self), fields(keyword = %query.keyword))]
    pub async fn list_products(
        &self,
        query: &ProductQuery,
        page: Option<PageRequest>,
    ) -> Result<ProductPage> {
        let mut url = self.endpoint("products")?;
        {
            let mut pairs = url.query_pairs_mut();
            if !query.keyword.is_empty() {
                pairs.append_pair("search", &query.keyword);
            }
            if !query.categories.is_empty() {
                pairs.append_pair("categories", &query.categories_param());
            }
            if query.price_range != ProductQuery::default().price_range {
                pairs.append_pair("priceMin", &query.price_range.0.to_string());
                pairs.append_pair("priceMax", &query.price_range.1.to_string());
            }
            if let Some(page) = page {
                pairs.append_pair("offset", &page.offset.to_string());
                pairs.append_pair("limit", &page.limit.to_string());
            }
        }

        let response = self.http().get(url).send().await?;
        let list: RawProductList = Self::decode(response, "product list").await?;
        let (rows, count) = list.into_rows()?;
        tracing::debug!(rows = rows.len(), count, "Fetched product page");
        Ok(ProductPage { rows, count })
    }

    /// Fetch the featured products shown on the home page.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>> {
        let mut url = self.endpoint("products")?;
        url.query_pairs_mut().append_pair("featured", "true");

        let response = self.http().get(url).send().await?;
        let list: RawProductList = Self::decode(response, "featured products").await?;
        let (rows, _) = list.into_rows()?;
        Ok(rows)
    }

    /// Fetch a single product by its URL slug.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no product has that slug.
    #[instrument(skip(self))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product> {
        let url = self.endpoint(&format!("products/{slug}"))?;
        let response = self.http().get(url).send().await?;
        let envelope: Envelope<RawProduct> = Self::decode(response, "product").await?;
        // The backend answers unknown slugs with success=false instead of 404.
        if envelope.success == Some(false) {
            return Err(ApiError::NotFound(format!("product '{slug}'")));
        }
        envelope
            .data
            .ok_or_else(|| ApiError::NotFound(format!("product '{slug}'")))?
            .into_product()
    }
}
