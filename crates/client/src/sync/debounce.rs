//! Debounced commit of product query edits.
//!
//! UI edits land in a draft query synchronously, so the caller can echo
//! them back to the user immediately. What actually reaches the network is
//! the *committed* query, published on a `watch` channel with per-field
//! timing: keyword edits commit only after a quiet period with no further
//! keystrokes, while category and price edits commit at once. A discrete
//! edit never drags a half-typed keyword along with it; the pending
//! keyword keeps its own timer and lands on its own schedule.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::watch;

use phutung_core::ProductQuery;

struct Draft {
    query: ProductQuery,
    /// Bumped on every keyword edit; a sleeping commit task only fires if
    /// its epoch is still the latest when it wakes.
    keyword_epoch: u64,
}

struct DebouncerInner {
    quiet_period: Duration,
    draft: Mutex<Draft>,
    committed: watch::Sender<ProductQuery>,
}

impl DebouncerInner {
    fn lock(&self) -> std::sync::MutexGuard<'_, Draft> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit_keyword(&self) {
        let keyword = self.lock().query.keyword.clone();
        self.committed.send_if_modified(|query| {
            if query.keyword == keyword {
                false
            } else {
                query.keyword = keyword;
                true
            }
        });
    }
}

/// Field-aware debouncer in front of a [`ProductQuery`].
///
/// Clones share the same draft and committed query.
#[derive(Clone)]
pub struct QueryDebouncer {
    inner: Arc<DebouncerInner>,
}

impl QueryDebouncer {
    /// Create a debouncer. `quiet_period` is how long the keyword must
    /// stay untouched before it commits.
    #[must_use]
    pub fn new(initial: ProductQuery, quiet_period: Duration) -> Self {
        Self {
            inner: Arc::new(DebouncerInner {
                quiet_period,
                draft: Mutex::new(Draft {
                    query: initial.clone(),
                    keyword_epoch: 0,
                }),
                committed: watch::Sender::new(initial),
            }),
        }
    }

    /// Record a keyword edit. The draft updates immediately; the committed
    /// query updates once the keyword has been quiet for the configured
    /// period.
    pub fn set_keyword(&self, keyword: &str) {
        let epoch = {
            let mut draft = self.inner.lock();
            draft.query = std::mem::take(&mut draft.query).with_keyword(keyword);
            draft.keyword_epoch += 1;
            draft.keyword_epoch
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.quiet_period).await;
            if inner.lock().keyword_epoch != epoch {
                return;
            }
            tracing::debug!("Keyword quiet period elapsed; committing");
            inner.commit_keyword();
        });
    }

    /// Replace the category selection. Commits immediately.
    pub fn set_categories(&self, categories: BTreeSet<String>) {
        {
            let mut draft = self.inner.lock();
            draft.query.categories.clone_from(&categories);
        }
        self.inner.committed.send_if_modified(|query| {
            if query.categories == categories {
                false
            } else {
                query.categories = categories;
                true
            }
        });
    }

    /// Replace the price bounds. Commits immediately; bounds given in
    /// reverse order are swapped.
    pub fn set_price_range(&self, min: Decimal, max: Decimal) {
        let range = if min <= max { (min, max) } else { (max, min) };
        {
            let mut draft = self.inner.lock();
            draft.query.price_range = range;
        }
        self.inner.committed.send_if_modified(|query| {
            if query.price_range == range {
                false
            } else {
                query.price_range = range;
                true
            }
        });
    }

    /// Commit any pending keyword right now, cancelling its timer. Wired
    /// to an explicit search submit.
    pub fn flush_keyword(&self) {
        self.inner.lock().keyword_epoch += 1;
        self.inner.commit_keyword();
    }

    /// The draft query as the user currently sees it, pending edits
    /// included.
    #[must_use]
    pub fn draft(&self) -> ProductQuery {
        self.inner.lock().query.clone()
    }

    /// The committed query. Changes only when a field actually commits to
    /// a different value.
    #[must_use]
    pub fn committed(&self) -> watch::Receiver<ProductQuery> {
        self.inner.committed.subscribe()
    }
}

impl std::fmt::Debug for QueryDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryDebouncer")
            .field("quiet_period", &self.inner.quiet_period)
            .field("draft", &self.draft())
            .finish()
    }
}
