//! In-process storefront backend.
//!
//! Mirrors the storefront's development server: carts live in a map keyed by
//! owner id, totals are computed from catalog prices, and line snapshots are
//! refreshed from the catalog on every mutation. Product listings are served
//! from the same catalog.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tracing::debug;

use super::types::RepositoryError;
use super::{CartRepository, ProductRepository};
use crate::catalog::{Catalog, Page, Product, ProductFilter, ProductSummary};
use crate::domain::{Cart, CartLine};

#[derive(Default)]
struct State {
    carts: HashMap<String, Cart>,
    failures: VecDeque<RepositoryError>,
}

#[derive(Default)]
pub struct InMemoryCartRepository {
    catalog: Catalog,
    state: Mutex<State>,
}

impl InMemoryCartRepository {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            state: Mutex::new(State::default()),
        }
    }

    /// Backed by the storefront's sample products.
    pub fn with_default_catalog() -> Self {
        Self::new(Catalog::with_default_products())
    }

    /// Make the next repository call fail with `error`. Queued failures are
    /// consumed in order, one per call.
    pub fn fail_next(&self, error: RepositoryError) {
        self.lock().failures.push_back(error);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // Every critical section leaves State consistent, so a poisoned lock
        // still holds usable data.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn take_failure(state: &mut State) -> Result<(), RepositoryError> {
        match state.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Refresh snapshots from the catalog and recompute server totals.
    fn reprice(&self, cart: &mut Cart) {
        for line in &mut cart.lines {
            if let Some(sku) = self.catalog.sku(&line.sku_id) {
                line.snapshot = Some(sku.snapshot());
            }
        }
        cart.total_quantity = cart.lines.iter().map(|l| u64::from(l.quantity)).sum();
        cart.total_price = cart
            .lines
            .iter()
            .map(|l| {
                let price = self.catalog.sku(&l.sku_id).map_or(0.0, |s| s.price);
                price * f64::from(l.quantity)
            })
            .sum();
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn get_cart(&self, owner_id: &str) -> Result<Cart, RepositoryError> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        Ok(state
            .carts
            .get(owner_id)
            .cloned()
            .unwrap_or_else(|| Cart::empty(owner_id)))
    }

    async fn add_to_cart(
        &self,
        owner_id: &str,
        sku_id: &str,
        quantity: u32,
    ) -> Result<Cart, RepositoryError> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        if sku_id.is_empty() {
            return Err(RepositoryError::Validation("skuId required".to_string()));
        }

        let mut cart = state
            .carts
            .remove(owner_id)
            .unwrap_or_else(|| Cart::empty(owner_id));
        cart.merge_line(CartLine::new(sku_id, quantity.max(1)));
        self.reprice(&mut cart);
        debug!("Server cart {} now holds {} items", owner_id, cart.total_quantity);

        state.carts.insert(owner_id.to_string(), cart.clone());
        Ok(cart)
    }

    async fn update_cart_item(
        &self,
        owner_id: &str,
        sku_id: &str,
        quantity: u32,
    ) -> Result<Cart, RepositoryError> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        let cart = state
            .carts
            .get_mut(owner_id)
            .ok_or_else(|| RepositoryError::NotFound("Cart not found".to_string()))?;
        let line = cart
            .line_mut(sku_id)
            .ok_or_else(|| RepositoryError::NotFound("Item not found".to_string()))?;
        line.quantity = quantity;
        self.reprice(cart);
        Ok(cart.clone())
    }

    async fn remove_from_cart(&self, owner_id: &str, sku_id: &str) -> Result<Cart, RepositoryError> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        let cart = state
            .carts
            .get_mut(owner_id)
            .ok_or_else(|| RepositoryError::NotFound("Cart not found".to_string()))?;
        cart.lines.retain(|l| l.sku_id != sku_id);
        self.reprice(cart);
        Ok(cart.clone())
    }
}

#[async_trait]
impl ProductRepository for InMemoryCartRepository {
    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: usize,
        page_size: usize,
    ) -> Result<Page<ProductSummary>, RepositoryError> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        Ok(self.catalog.query(filter, page, page_size))
    }

    async fn get_product(&self, product_id: &str) -> Result<Product, RepositoryError> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        self.catalog
            .product(product_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound("Product not found".to_string()))
    }
}
