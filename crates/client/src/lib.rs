//! Phu Tung storefront client.
//!
//! Consumes the storefront REST API and keeps client-side collection state
//! in sync with it:
//!
//! - [`api`] - typed API client (products, categories, carts, orders, users,
//!   contacts) with response-envelope validation
//! - [`sync`] - the optimistic-update / debounced-query / superseding-fetch
//!   machinery that pages build on
//! - [`session`] - the injected logged-in-user context
//! - [`notify`] - non-blocking transient notices for recoverable errors
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use phutung_client::{ApiClient, ClientConfig, notify};
//! use phutung_client::sync::{CollectionStore, QueryDebouncer, spawn_query_pump};
//! use phutung_core::ProductQuery;
//!
//! let config = ClientConfig::from_env()?;
//! let client = ApiClient::new(&config)?;
//! let (notices, mut inbox) = notify::channel();
//!
//! let products = Arc::new(CollectionStore::new(
//!     Arc::new(client.clone()),
//!     "products",
//!     notices.clone(),
//! ));
//! let debouncer = QueryDebouncer::new(ProductQuery::default(), config.keyword_quiet_period);
//! spawn_query_pump(Arc::clone(&products), debouncer.committed());
//!
//! debouncer.set_keyword("lốp");
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod sync;

pub use api::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, Result};
pub use notify::{Notice, NoticeLevel, NoticeSender};
pub use session::Session;
