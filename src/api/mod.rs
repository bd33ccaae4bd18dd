//! Remote storefront access.
//!
//! [`CartRepository`] is the seam between the sync controller and whatever
//! holds the authoritative cart; [`ProductRepository`] serves the product
//! listing. [`HttpCartRepository`] talks to the storefront REST API and
//! [`InMemoryCartRepository`] keeps everything in process.

mod client;
mod http;
mod memory;
mod types;

pub use client::{HttpCartRepository, HttpRepositoryConfig, DEFAULT_TIMEOUT_SECS};
pub use http::RetryPolicy;
pub use memory::InMemoryCartRepository;
pub use types::{AddToCartRequest, RepositoryError, UpdateCartItemRequest};

use async_trait::async_trait;

use crate::catalog::{Page, Product, ProductFilter, ProductSummary};
use crate::domain::Cart;

/// Authoritative cart service. Every successful call returns the full cart
/// as the server sees it after the operation.
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn get_cart(&self, owner_id: &str) -> Result<Cart, RepositoryError>;

    async fn add_to_cart(
        &self,
        owner_id: &str,
        sku_id: &str,
        quantity: u32,
    ) -> Result<Cart, RepositoryError>;

    async fn update_cart_item(
        &self,
        owner_id: &str,
        sku_id: &str,
        quantity: u32,
    ) -> Result<Cart, RepositoryError>;

    async fn remove_from_cart(&self, owner_id: &str, sku_id: &str) -> Result<Cart, RepositoryError>;
}

/// Read-only product listing and detail.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: usize,
        page_size: usize,
    ) -> Result<Page<ProductSummary>, RepositoryError>;

    async fn get_product(&self, product_id: &str) -> Result<Product, RepositoryError>;
}
