//! Checkout flow.
//!
//! Checkout is never optimistic: the order must exist on the server before
//! anything local changes. For cash-on-delivery the cart is cleared once
//! the order is accepted. For PayPal the caller gets the approval URL and
//! the cart stays intact, because the shopper can still abandon the
//! payment.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use url::Url;

use phutung_core::{OrderDraft, OrderId, PaymentMethod, ShippingDetails};

use crate::api::{ApiClient, PlacedOrder};
use crate::error::{ApiError, Result};
use crate::notify::NoticeSender;
use crate::session::Session;
use crate::sync::cart::CartStore;

/// Order submission, implemented by [`ApiClient`] for the real backend
/// and by scripted fakes in tests.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    async fn place(&self, draft: &OrderDraft) -> Result<PlacedOrder>;
}

#[async_trait]
impl OrderBackend for ApiClient {
    async fn place(&self, draft: &OrderDraft) -> Result<PlacedOrder> {
        self.place_order(draft).await
    }
}

/// What happened when an order was placed.
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// The order is final. The cart has been cleared.
    Completed { order_id: Option<OrderId> },
    /// The shopper must approve the payment externally. The cart is left
    /// untouched until they do.
    RedirectToApproval { url: Url },
}

/// Coordinates order placement against the signed-in user's cart.
pub struct Checkout {
    backend: Arc<dyn OrderBackend>,
    session: Session,
    notices: NoticeSender,
}

impl Checkout {
    pub fn new(backend: Arc<dyn OrderBackend>, session: Session, notices: NoticeSender) -> Self {
        Self {
            backend,
            session,
            notices,
        }
    }

    /// Place an order for everything currently in the cart.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthenticated`] with nobody signed in,
    /// [`ApiError::EmptyCart`] for an empty cart, [`ApiError::Shipping`]
    /// for incomplete shipping details, or whatever the backend rejected
    /// the order with. On any error the cart is untouched.
    #[instrument(skip(self, cart, shipping, note), fields(payment = payment.as_str()))]
    pub async fn place(
        &self,
        cart: &Arc<CartStore>,
        shipping: &ShippingDetails,
        payment: PaymentMethod,
        note: Option<String>,
    ) -> Result<CheckoutOutcome> {
        let user = self.session.require_user()?.id;

        let lines = cart.lines();
        if lines.is_empty() {
            return Err(ApiError::EmptyCart);
        }

        let draft = OrderDraft::from_cart(user, &lines, shipping, payment, note)?;
        let placed = self.backend.place(&draft).await?;

        if let Some(url) = placed.approve_url {
            tracing::info!(%url, "Awaiting external payment approval");
            return Ok(CheckoutOutcome::RedirectToApproval { url });
        }

        // The order exists; a failed cart clear must not fail checkout.
        if let Err(e) = cart.clear().await {
            tracing::warn!(error = %e, "Cart clear after checkout failed");
        }
        self.notices.success("Đặt hàng thành công");
        Ok(CheckoutOutcome::Completed {
            order_id: placed.order_id,
        })
    }
}
