//! Generic store for a remote collection keyed by a query.
//!
//! A [`CollectionStore`] owns the fetch lifecycle for one collection: it
//! tracks the query most recently asked for, suppresses refetches of an
//! unchanged query, and stamps every fetch with a generation counter so a
//! response that was overtaken by a newer request is dropped instead of
//! clobbering fresher data. Requests are never queued; the newest query
//! always wins.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;

use phutung_core::{FetchState, Order, Product, ProductQuery, UserId};

use crate::api::ApiClient;
use crate::error::Result;
use crate::notify::NoticeSender;

/// Where a store's rows come from. Implemented by [`ApiClient`] for the
/// real backend and by scripted fakes in tests.
#[async_trait]
pub trait CollectionSource<Q, T>: Send + Sync {
    async fn fetch(&self, query: &Q) -> Result<Vec<T>>;
}

struct StoreInner<Q, T> {
    state: FetchState<T>,
    /// Rows from the last successful fetch, kept across `Loading` and
    /// `Failed` so consumers always have something to show.
    rows: Vec<T>,
    last_query: Option<Q>,
    generation: u64,
}

/// A remote collection with stale-while-revalidate semantics.
pub struct CollectionStore<Q, T> {
    source: Arc<dyn CollectionSource<Q, T>>,
    notices: NoticeSender,
    label: &'static str,
    inner: Mutex<StoreInner<Q, T>>,
    version: watch::Sender<u64>,
}

impl<Q, T> CollectionStore<Q, T>
where
    Q: Clone + PartialEq + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        source: Arc<dyn CollectionSource<Q, T>>,
        label: &'static str,
        notices: NoticeSender,
    ) -> Self {
        Self {
            source,
            notices,
            label,
            inner: Mutex::new(StoreInner {
                state: FetchState::Idle,
                rows: Vec::new(),
                last_query: None,
                generation: 0,
            }),
            version: watch::Sender::new(0),
        }
    }

    /// Fetch rows for `query`, replacing whatever fetch is in flight.
    ///
    /// If `query` equals the store's current query and the store is
    /// already `Ready` or still `Loading` that same query, nothing is
    /// fetched. A changed query supersedes any in-flight fetch: the old
    /// response is dropped when it eventually lands.
    pub async fn load(&self, query: Q) {
        let generation = {
            let mut inner = self.lock();
            let unchanged = inner.last_query.as_ref() == Some(&query)
                && matches!(
                    inner.state,
                    FetchState::Ready { .. } | FetchState::Loading
                );
            if unchanged {
                tracing::debug!(store = self.label, "Query unchanged; fetch suppressed");
                return;
            }
            inner.generation += 1;
            inner.last_query = Some(query.clone());
            inner.state = FetchState::Loading;
            inner.generation
        };
        self.bump();
        self.settle(generation, &query).await;
    }

    /// Refetch the current query unconditionally, bypassing suppression.
    /// Used after a failed optimistic write to resynchronize with the
    /// server. Does nothing if no query has been loaded yet.
    pub async fn reload(&self) {
        let (generation, query) = {
            let mut inner = self.lock();
            let Some(query) = inner.last_query.clone() else {
                return;
            };
            inner.generation += 1;
            inner.state = FetchState::Loading;
            (inner.generation, query)
        };
        self.bump();
        self.settle(generation, &query).await;
    }

    async fn settle(&self, generation: u64, query: &Q) {
        let result = self.source.fetch(query).await;
        {
            let mut inner = self.lock();
            if inner.generation != generation {
                tracing::debug!(store = self.label, generation, "Superseded response dropped");
                return;
            }
            match result {
                Ok(rows) => {
                    inner.rows.clone_from(&rows);
                    inner.state = FetchState::Ready { rows };
                }
                Err(e) => {
                    tracing::warn!(store = self.label, error = %e, "Fetch failed");
                    self.notices
                        .error(format!("Không thể tải dữ liệu: {e}"));
                    inner.state = FetchState::Failed {
                        error: e.to_string(),
                    };
                }
            }
        }
        self.bump();
    }

    /// Current fetch phase.
    pub fn state(&self) -> FetchState<T> {
        self.lock().state.clone()
    }

    /// Rows from the most recent successful fetch. Stays populated while a
    /// newer fetch is loading or after one fails.
    pub fn rows(&self) -> Vec<T> {
        self.lock().rows.clone()
    }

    /// The query most recently passed to [`Self::load`].
    pub fn last_query(&self) -> Option<Q> {
        self.lock().last_query.clone()
    }

    /// A receiver that changes whenever the store's state does.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner<Q, T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CollectionSource<ProductQuery, Product> for ApiClient {
    async fn fetch(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        Ok(self.list_products(query, None).await?.rows)
    }
}

#[async_trait]
impl CollectionSource<UserId, Order> for ApiClient {
    async fn fetch(&self, user_id: &UserId) -> Result<Vec<Order>> {
        self.order_history(*user_id).await
    }
}
