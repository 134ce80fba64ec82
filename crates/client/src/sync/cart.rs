//! Cart store with optimistic writes.
//!
//! Quantity changes and removals are applied to the local cart
//! synchronously, then pushed to the backend in a background task. The
//! local patch is the caller's immediate echo; if the background request
//! fails, the store does not try to invert the patch - it re-fetches the
//! whole cart so the server stays the single source of truth. Adding a
//! product is the one network-first operation, because only the server can
//! mint the new line's id.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::watch;

use phutung_core::{cart_total, CartLine, CartLineId, FetchState, Pricing, Product, ProductId, UserId};

use crate::api::ApiClient;
use crate::error::{ApiError, Result};
use crate::notify::NoticeSender;
use crate::session::Session;

/// Cart persistence operations, implemented by [`ApiClient`] for the real
/// backend and by scripted fakes in tests.
#[async_trait]
pub trait CartBackend: Send + Sync {
    async fn fetch_lines(&self, user: UserId) -> Result<Vec<CartLine>>;
    async fn add_line(&self, user: UserId, product: ProductId, quantity: u32) -> Result<()>;
    async fn set_line_quantity(&self, line: CartLineId, quantity: u32) -> Result<()>;
    async fn remove_line(&self, line: CartLineId) -> Result<()>;
    async fn clear(&self, user: UserId) -> Result<()>;
    async fn count(&self, user: UserId) -> Result<u32>;
}

#[async_trait]
impl CartBackend for ApiClient {
    async fn fetch_lines(&self, user: UserId) -> Result<Vec<CartLine>> {
        self.cart_lines(user).await
    }

    async fn add_line(&self, user: UserId, product: ProductId, quantity: u32) -> Result<()> {
        self.add_cart_line(user, product, quantity).await
    }

    async fn set_line_quantity(&self, line: CartLineId, quantity: u32) -> Result<()> {
        self.update_cart_line(line, quantity).await
    }

    async fn remove_line(&self, line: CartLineId) -> Result<()> {
        self.remove_cart_line(line).await
    }

    async fn clear(&self, user: UserId) -> Result<()> {
        self.clear_cart(user).await
    }

    async fn count(&self, user: UserId) -> Result<u32> {
        self.cart_count(user).await
    }
}

enum Phase {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

struct CartInner {
    lines: Vec<CartLine>,
    phase: Phase,
    /// Stamps fetches and optimistic patches; a fetch response whose
    /// generation is no longer current is dropped.
    generation: u64,
}

/// The signed-in user's cart, with optimistic local writes.
pub struct CartStore {
    backend: Arc<dyn CartBackend>,
    session: Session,
    notices: NoticeSender,
    max_line_quantity: u32,
    inner: Mutex<CartInner>,
    badge: watch::Sender<u32>,
    version: watch::Sender<u64>,
}

impl CartStore {
    pub fn new(
        backend: Arc<dyn CartBackend>,
        session: Session,
        notices: NoticeSender,
        max_line_quantity: u32,
    ) -> Arc<Self> {
        Arc::new(Self {
            backend,
            session,
            notices,
            max_line_quantity,
            inner: Mutex::new(CartInner {
                lines: Vec::new(),
                phase: Phase::Idle,
                generation: 0,
            }),
            badge: watch::Sender::new(0),
            version: watch::Sender::new(0),
        })
    }

    // === Reads ===

    /// Current cart lines, optimistic patches included.
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().lines.clone()
    }

    /// Fetch phase, with the current lines attached when `Ready`.
    pub fn state(&self) -> FetchState<CartLine> {
        let inner = self.lock();
        match &inner.phase {
            Phase::Idle => FetchState::Idle,
            Phase::Loading => FetchState::Loading,
            Phase::Ready => FetchState::Ready {
                rows: inner.lines.clone(),
            },
            Phase::Failed(error) => FetchState::Failed {
                error: error.clone(),
            },
        }
    }

    /// Cart total over the current (possibly optimistic) lines.
    pub fn total(&self) -> Decimal {
        cart_total(&self.lock().lines)
    }

    /// Total item count shown on the cart badge. Updated by optimistic
    /// patches immediately and reconciled against the server by
    /// [`Self::refresh_badge`].
    pub fn badge(&self) -> watch::Receiver<u32> {
        self.badge.subscribe()
    }

    /// A receiver that changes whenever the cart does.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    // === Fetching ===

    /// Re-fetch the cart from the backend. For an anonymous session the
    /// cart resets to empty.
    pub async fn refresh(&self) {
        let Some(user) = self.session.user_id() else {
            self.reset_local();
            return;
        };

        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.phase = Phase::Loading;
            inner.generation
        };
        self.bump();

        let result = self.backend.fetch_lines(user).await;
        {
            let mut inner = self.lock();
            if inner.generation != generation {
                tracing::debug!(generation, "Superseded cart fetch dropped");
                return;
            }
            match result {
                Ok(lines) => {
                    inner.lines = lines;
                    inner.phase = Phase::Ready;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cart fetch failed");
                    self.notices.error(format!("Không thể tải giỏ hàng: {e}"));
                    inner.phase = Phase::Failed(e.to_string());
                }
            }
        }
        self.publish_badge_from_lines();
        self.bump();
    }

    /// Ask the backend for the authoritative item count and publish it on
    /// the badge channel. Fetches only the count, not the full cart.
    pub async fn refresh_badge(&self) {
        let Some(user) = self.session.user_id() else {
            self.badge.send_if_modified(|b| std::mem::replace(b, 0) != 0);
            return;
        };
        match self.backend.count(user).await {
            Ok(count) => {
                self.badge
                    .send_if_modified(|b| std::mem::replace(b, count) != count);
            }
            Err(e) => tracing::warn!(error = %e, "Cart badge fetch failed"),
        }
    }

    // === Optimistic writes ===

    /// Set a line's quantity. The local cart and badge update before this
    /// returns; the backend write happens in the background. On failure
    /// the cart is re-fetched rather than patched back.
    ///
    /// # Errors
    ///
    /// [`ApiError::QuantityOutOfRange`] when `quantity` is zero or above
    /// the per-line maximum, [`ApiError::Unauthenticated`] when nobody is
    /// signed in. Neither touches local state.
    pub fn set_quantity(self: &Arc<Self>, line_id: CartLineId, quantity: u32) -> Result<()> {
        self.check_quantity(quantity)?;
        self.session.require_user()?;

        let patched = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            match inner.lines.iter_mut().find(|l| l.id == line_id) {
                Some(line) => {
                    line.quantity = quantity;
                    inner.generation += 1;
                    true
                }
                None => false,
            }
        };
        if !patched {
            return Err(ApiError::NotFound(format!("cart line {line_id}")));
        }
        self.publish_badge_from_lines();
        self.bump();

        let store = Arc::clone(self);
        tokio::spawn(async move {
            match store.backend.set_line_quantity(line_id, quantity).await {
                Ok(()) => store.refresh_badge().await,
                Err(e) => {
                    tracing::warn!(error = %e, %line_id, "Cart quantity update failed");
                    store
                        .notices
                        .error(format!("Cập nhật giỏ hàng thất bại: {e}"));
                    store.refresh().await;
                }
            }
        });
        Ok(())
    }

    /// Remove a line. Removing a line that is not in the local cart is a
    /// no-op, so a double-click on a row that already went away does not
    /// produce a second request or an error.
    pub fn remove_line(self: &Arc<Self>, line_id: CartLineId) -> Result<()> {
        self.session.require_user()?;

        let removed = {
            let mut inner = self.lock();
            let before = inner.lines.len();
            inner.lines.retain(|l| l.id != line_id);
            if inner.lines.len() == before {
                false
            } else {
                inner.generation += 1;
                true
            }
        };
        if !removed {
            return Ok(());
        }
        self.publish_badge_from_lines();
        self.bump();

        let store = Arc::clone(self);
        tokio::spawn(async move {
            match store.backend.remove_line(line_id).await {
                Ok(()) => store.refresh_badge().await,
                Err(e) => {
                    tracing::warn!(error = %e, %line_id, "Cart removal failed");
                    store.notices.error(format!("Xóa sản phẩm thất bại: {e}"));
                    store.refresh().await;
                }
            }
        });
        Ok(())
    }

    // === Network-first writes ===

    /// Add a product to the cart, then re-fetch so the server-assigned
    /// line shows up.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotPurchasable`] for contact-for-price products, plus
    /// the same validation errors as [`Self::set_quantity`].
    pub async fn add_product(&self, product: &Product, quantity: u32) -> Result<()> {
        if product.pricing == Pricing::Contact {
            return Err(ApiError::NotPurchasable);
        }
        self.check_quantity(quantity)?;
        let user = self.session.require_user()?.id;

        self.backend.add_line(user, product.id, quantity).await?;
        self.refresh().await;
        self.notices.success("Đã thêm vào giỏ hàng");
        Ok(())
    }

    /// Remove every line. Clears locally first, then tells the backend.
    pub async fn clear(&self) -> Result<()> {
        let user = self.session.require_user()?.id;

        {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.lines.clear();
            inner.phase = Phase::Ready;
        }
        self.publish_badge_from_lines();
        self.bump();

        if let Err(e) = self.backend.clear(user).await {
            tracing::warn!(error = %e, "Cart clear failed");
            self.refresh().await;
            return Err(e);
        }
        Ok(())
    }

    // === Internals ===

    fn check_quantity(&self, quantity: u32) -> Result<()> {
        if quantity == 0 || quantity > self.max_line_quantity {
            return Err(ApiError::QuantityOutOfRange {
                quantity,
                max: self.max_line_quantity,
            });
        }
        Ok(())
    }

    fn reset_local(&self) {
        {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.lines.clear();
            inner.phase = Phase::Idle;
        }
        self.publish_badge_from_lines();
        self.bump();
    }

    fn publish_badge_from_lines(&self) {
        let count = self.lock().lines.iter().map(|l| l.quantity).sum();
        self.badge
            .send_if_modified(|b| std::mem::replace(b, count) != count);
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CartInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lock().lines.len())
            .finish_non_exhaustive()
    }
}
