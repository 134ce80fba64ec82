//! Cart endpoints.
//!
//! The backend addresses carts by user id and individual lines by cart
//! line id. Mutations return an envelope with no useful payload; callers
//! re-fetch the cart when they need the authoritative state.

use serde::Serialize;
use tracing::instrument;

use phutung_core::{CartLine, CartLineId, ProductId, UserId};

use crate::error::Result;

use super::wire::{Envelope, RawCartLine};
use super::ApiClient;

#[derive(Debug, Serialize)]
struct AddLineBody {
    #[serde(rename = "userId")]
    user_id: UserId,
    #[serde(rename = "productId")]
    product_id: ProductId,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct UpdateLineBody {
    #[serde(rename = "cartItemId")]
    cart_item_id: CartLineId,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct RemoveLineBody {
    #[serde(rename = "cartItemId")]
    cart_item_id: CartLineId,
}

impl ApiClient {
    /// Fetch the cart for a user, oldest line first.
    ///
    /// The backend does not guarantee an order, so lines are sorted by
    /// creation time here to keep row positions stable across refreshes.
    #[instrument(skip(self))]
    pub async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>> {
        let url = self.endpoint(&format!("carts/{user_id}"))?;
        let response = self.http().get(url).send().await?;
        let envelope: Envelope<Vec<RawCartLine>> = Self::decode(response, "cart").await?;
        let mut lines = envelope
            .into_data("cart")?
            .into_iter()
            .map(RawCartLine::into_cart_line)
            .collect::<Result<Vec<_>>>()?;
        lines.sort_by_key(|line| line.created_at);
        Ok(lines)
    }

    /// Total quantity across all of a user's cart lines.
    #[instrument(skip(self))]
    pub async fn cart_count(&self, user_id: UserId) -> Result<u32> {
        let lines = self.cart_lines(user_id).await?;
        Ok(lines.iter().map(|line| line.quantity).sum())
    }

    /// Add a product to the cart. The backend merges into an existing line
    /// for the same product if there is one.
    #[instrument(skip(self))]
    pub async fn add_cart_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<()> {
        let url = self.endpoint("carts/add")?;
        let response = self
            .http()
            .post(url)
            .json(&AddLineBody {
                user_id,
                product_id,
                quantity,
            })
            .send()
            .await?;
        Self::check_mutation(response, "cart add").await
    }

    /// Set the absolute quantity of an existing cart line.
    #[instrument(skip(self))]
    pub async fn update_cart_line(&self, line_id: CartLineId, quantity: u32) -> Result<()> {
        let url = self.endpoint("carts/update")?;
        let response = self
            .http()
            .put(url)
            .json(&UpdateLineBody {
                cart_item_id: line_id,
                quantity,
            })
            .send()
            .await?;
        Self::check_mutation(response, "cart update").await
    }

    /// Remove a single cart line.
    #[instrument(skip(self))]
    pub async fn remove_cart_line(&self, line_id: CartLineId) -> Result<()> {
        let url = self.endpoint("carts/remove")?;
        let response = self
            .http()
            .delete(url)
            .json(&RemoveLineBody {
                cart_item_id: line_id,
            })
            .send()
            .await?;
        Self::check_mutation(response, "cart remove").await
    }

    /// Remove every line from a user's cart.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<()> {
        let url = self.endpoint(&format!("carts/clear/{user_id}"))?;
        let response = self.http().delete(url).send().await?;
        Self::check_mutation(response, "cart clear").await
    }
}
