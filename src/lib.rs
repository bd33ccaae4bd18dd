//! Storefront cart library.
//!
//! Two independent cart representations live here:
//!
//! - [`store`]: the device-local cart, persisted synchronously per owner id.
//! - [`sync`]: the remote-backed cart, held in memory by a
//!   [`sync::CartController`] that applies optimistic edits and reconciles
//!   with a [`api::CartRepository`].
//!
//! They do not share state. [`catalog`] holds the product listing the
//! in-process backend prices carts from.

pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod store;
pub mod sync;

pub use api::{
    CartRepository, HttpCartRepository, InMemoryCartRepository, ProductRepository, RepositoryError,
};
pub use catalog::{Catalog, Page, Product, ProductFilter, ProductSort, ProductSummary};
pub use config::StorefrontConfig;
pub use domain::{Cart, CartLine, LineSnapshot};
pub use store::{FileKeyValueStore, KeyValueStore, LocalCartStore, MemoryKeyValueStore, StoreError};
pub use sync::{CartController, ControllerConfig, ControllerState};
