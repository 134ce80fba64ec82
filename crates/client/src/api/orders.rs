//! Order endpoints.

use serde::Deserialize;
use tracing::instrument;
use url::Url;

use phutung_core::{Order, OrderDraft, OrderId, UserId};

use crate::error::{ApiError, Result};

use super::wire::{Envelope, RawOrder};
use super::ApiClient;

/// Result of placing an order.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    /// Id of the created order, when the backend reports one.
    pub order_id: Option<OrderId>,
    /// PayPal approval URL. Present only for PayPal orders; the order is
    /// not final until the shopper approves it there.
    pub approve_url: Option<Url>,
}

#[derive(Debug, Deserialize)]
struct PlaceOrderResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "approveUrl")]
    approve_url: Option<String>,
    #[serde(default)]
    data: Option<RawOrder>,
}

impl ApiClient {
    /// Submit an order draft.
    #[instrument(skip(self, draft), fields(payment = draft.payment_method.as_str()))]
    pub async fn place_order(&self, draft: &OrderDraft) -> Result<PlacedOrder> {
        let url = self.endpoint("orders")?;
        let response = self.http().post(url).json(draft).send().await?;
        let body: PlaceOrderResponse = Self::decode(response, "order").await?;

        if body.success == Some(false) {
            return Err(ApiError::Api(
                body.message
                    .unwrap_or_else(|| "order request failed".to_string()),
            ));
        }

        let approve_url = match body.approve_url {
            Some(raw) => Some(Url::parse(&raw)?),
            None => None,
        };
        let order_id = body.data.and_then(|raw| raw.id.map(OrderId::from));

        tracing::info!(?order_id, redirect = approve_url.is_some(), "Order placed");
        Ok(PlacedOrder {
            order_id,
            approve_url,
        })
    }

    /// Fetch a user's order history with line items, newest first.
    #[instrument(skip(self))]
    pub async fn order_history(&self, user_id: UserId) -> Result<Vec<Order>> {
        let url = self.endpoint(&format!("orders/user/{user_id}/details"))?;
        let response = self.http().get(url).send().await?;
        let envelope: Envelope<Vec<RawOrder>> = Self::decode(response, "orders").await?;
        let mut orders = envelope
            .into_data("orders")?
            .into_iter()
            .map(RawOrder::into_order)
            .collect::<Result<Vec<_>>>()?;
        orders.sort_by_key(|order| std::cmp::Reverse(order.created_at));
        Ok(orders)
    }
}
