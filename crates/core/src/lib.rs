//! Phu Tung Core - Shared domain types.
//!
//! This crate provides the common types used across the Phu Tung storefront
//! client:
//!
//! - [`types::id`] - Newtype wrappers for type-safe entity IDs
//! - [`types::pricing`] - Tagged plain/discounted pricing
//! - [`types::query`] - The immutable product query value object
//! - [`types::fetch`] - Fetch lifecycle state for remote collections
//! - [`types::cart`], [`types::order`], [`types::catalog`] - Entities
//!
//! # Architecture
//!
//! The core crate contains only types and a little pure arithmetic - no I/O,
//! no HTTP clients, no async. Entities are constructed from server responses
//! by the client crate; nothing here talks to the network.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
