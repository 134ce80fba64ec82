//! Core types for the Phu Tung storefront client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod contact;
pub mod fetch;
pub mod id;
pub mod order;
pub mod pricing;
pub mod query;
pub mod status;

pub use account::{ProfileUpdate, Role, UserRecord};
pub use cart::{CartLine, DEFAULT_MAX_LINE_QUANTITY, cart_total};
pub use catalog::{Category, Product, ProductSummary};
pub use contact::{ContactError, ContactMessage};
pub use fetch::FetchState;
pub use id::*;
pub use order::{Order, OrderDraft, OrderDraftItem, OrderItem, ShippingDetails, ShippingError};
pub use pricing::{Pricing, PricingError};
pub use query::ProductQuery;
pub use status::{OrderStatus, PaymentMethod};
