//! Device-local cart persistence.
//!
//! Carts are stored as JSON under `cart:<owner id>` in a [`KeyValueStore`].
//! This store is independent of the remote-backed cart held by
//! [`crate::sync::CartController`]; nothing reconciles the two.

mod kv;

pub use kv::{compute_key_uuid, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Cart, CartLine};

const KEY_PREFIX: &str = "cart";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Item not found: {sku_id} in cart {owner_id}")]
    NotFound { owner_id: String, sku_id: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub fn storage_key(owner_id: &str) -> String {
    format!("{}:{}", KEY_PREFIX, owner_id)
}

/// Synchronous cart store over a key-value backend.
#[derive(Debug)]
pub struct LocalCartStore<S> {
    backend: S,
}

impl<S: KeyValueStore> LocalCartStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Load the cart for `owner_id`. Absent or unparseable data yields an
    /// empty cart.
    pub fn read(&self, owner_id: &str) -> Cart {
        let key = storage_key(owner_id);
        let Some(raw) = self.backend.get(&key) else {
            return Cart::empty(owner_id);
        };
        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => cart,
            Err(e) => {
                warn!("Ignoring malformed cart data under {}: {}", key, e);
                Cart::empty(owner_id)
            }
        }
    }

    /// Persist the full cart under its owner id, replacing any prior value.
    pub fn write(&self, cart: &Cart) {
        let key = storage_key(&cart.owner_id);
        match serde_json::to_string(cart) {
            Ok(raw) => self.backend.set(&key, &raw),
            Err(e) => warn!("Failed to serialize cart {}: {}", key, e),
        }
    }

    pub fn add_line(&self, owner_id: &str, line: CartLine) -> Cart {
        let mut cart = self.read(owner_id);
        debug!("Adding {} x{} to local cart {}", line.sku_id, line.quantity, owner_id);
        cart.merge_line(line);
        self.write(&cart);
        cart
    }

    /// Set the quantity of an existing line. Zero is stored as-is; clamping
    /// is the caller's decision.
    pub fn update_line(&self, owner_id: &str, sku_id: &str, quantity: u32) -> Result<Cart> {
        let mut cart = self.read(owner_id);
        let line = cart.line_mut(sku_id).ok_or_else(|| StoreError::NotFound {
            owner_id: owner_id.to_string(),
            sku_id: sku_id.to_string(),
        })?;
        line.quantity = quantity;
        cart.recompute_totals();
        self.write(&cart);
        Ok(cart)
    }

    /// Drop the stored cart for `owner_id`. A later read yields an empty cart.
    pub fn clear(&self, owner_id: &str) -> Cart {
        self.backend.remove(&storage_key(owner_id));
        Cart::empty(owner_id)
    }

    /// Remove a line. Removing a SKU that is not in the cart is a no-op.
    pub fn remove_line(&self, owner_id: &str, sku_id: &str) -> Cart {
        let mut cart = self.read(owner_id);
        if cart.remove_line(sku_id).is_none() {
            debug!("{} not in local cart {}; nothing to remove", sku_id, owner_id);
        }
        self.write(&cart);
        cart
    }
}
