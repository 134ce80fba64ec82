//! Client-side state kept in sync with the backend.
//!
//! Three cooperating pieces:
//!
//! - [`QueryDebouncer`] turns keystroke-level filter edits into a stream
//!   of committed queries, with the keyword debounced and discrete
//!   filters immediate.
//! - [`CollectionStore`] fetches rows for the newest committed query,
//!   dropping superseded responses and keeping stale rows visible across
//!   reloads and failures.
//! - [`CartStore`] and [`Checkout`] handle writes: cart mutations are
//!   optimistic with reload-on-failure, order placement is strictly
//!   server-first.
//!
//! [`spawn_query_pump`] wires the first two together.

pub mod cart;
pub mod checkout;
pub mod debounce;
pub mod store;

pub use cart::{CartBackend, CartStore};
pub use checkout::{Checkout, CheckoutOutcome, OrderBackend};
pub use debounce::QueryDebouncer;
pub use store::{CollectionSource, CollectionStore};

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Drive a store from a stream of committed queries.
///
/// Loads the receiver's current query immediately, then reloads on every
/// change. If commits arrive while a load is in flight, only the newest
/// is loaded next; intermediate queries are skipped. The task ends when
/// the sender side is dropped.
pub fn spawn_query_pump<Q, T>(
    store: Arc<CollectionStore<Q, T>>,
    mut committed: watch::Receiver<Q>,
) -> JoinHandle<()>
where
    Q: Clone + PartialEq + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        loop {
            let query = committed.borrow_and_update().clone();
            store.load(query).await;
            if committed.changed().await.is_err() {
                break;
            }
        }
    })
}
