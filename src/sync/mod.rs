//! Remote-backed cart state with optimistic updates.
//!
//! [`CartController`] mirrors the authoritative cart held by a
//! [`CartRepository`]:
//!
//! - `fetch_cart` / `add_to_cart` wait for the server and replace the cart
//!   wholesale on success.
//! - `update_quantity` edits the local line immediately and sends only the
//!   latest quantity once the (owner, sku) key has been quiet for the
//!   debounce window.
//! - `remove_item` drops the line immediately and restores the whole prior
//!   cart if the server rejects the delete.
//!
//! Remote failures never escape: they land in [`ControllerState::last_error`].
//! State lives in a `tokio::sync::watch` channel, so callers can either take
//! snapshots or [`subscribe`](CartController::subscribe) to changes.

mod debounce;
mod types;

pub use debounce::DebounceKey;
pub use types::{ControllerConfig, ControllerState, DEFAULT_DEBOUNCE};

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::api::{CartRepository, RepositoryError};
use crate::domain::Cart;
use debounce::DebounceTable;

struct Inner {
    repository: Arc<dyn CartRepository>,
    config: ControllerConfig,
    state: watch::Sender<ControllerState>,
    pending: DebounceTable,
}

/// Session-scoped cart state holder. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CartController {
    inner: Arc<Inner>,
}

impl CartController {
    pub fn new(repository: Arc<dyn CartRepository>) -> Self {
        Self::with_config(repository, ControllerConfig::default())
    }

    pub fn with_config(repository: Arc<dyn CartRepository>, config: ControllerConfig) -> Self {
        let (state, _) = watch::channel(ControllerState::default());
        Self {
            inner: Arc::new(Inner {
                repository,
                config,
                state,
                pending: DebounceTable::default(),
            }),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> ControllerState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.inner.state.subscribe()
    }

    /// Replace the held cart without contacting the server, e.g. to hydrate
    /// a session from a previously fetched cart.
    pub fn set_cart(&self, cart: Option<Cart>) -> ControllerState {
        self.modify(|s| s.cart = cart)
    }

    /// Number of debounced quantity updates that have not fired yet.
    pub fn pending_updates(&self) -> usize {
        self.inner.pending.len()
    }

    /// Drop every debounced update that has not fired yet. Updates already
    /// sent are unaffected.
    pub fn cancel_pending_updates(&self) -> usize {
        let dropped = self.inner.pending.cancel_all();
        if dropped > 0 {
            info!("Cancelled {} pending quantity update(s)", dropped);
        }
        dropped
    }

    /// Wait until no debounced update is pending and no remote call is in
    /// flight, then return the resulting state.
    pub async fn settled(&self) -> ControllerState {
        let mut rx = self.subscribe();
        loop {
            let syncing = rx.borrow_and_update().is_syncing;
            if !syncing && self.pending_updates() == 0 {
                return self.state();
            }
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        return self.state();
                    }
                }
                _ = sleep(self.inner.config.debounce) => {}
            }
        }
    }

    pub async fn fetch_cart(&self, owner_id: &str) -> ControllerState {
        self.modify(|s| {
            s.begin_sync();
            s.last_error = None;
        });

        let result = self.inner.repository.get_cart(owner_id).await;
        match &result {
            Ok(cart) => info!("Fetched cart {} ({} items)", owner_id, cart.total_quantity),
            Err(e) => warn!("Failed to fetch cart {}: {}", owner_id, e),
        }

        self.modify(|s| {
            match result {
                Ok(cart) => s.cart = Some(cart),
                Err(e) => s.last_error = Some(error_message(&e)),
            }
            s.end_sync();
        })
    }

    /// Add `quantity` of `sku_id`. The quantity must be positive; callers
    /// validate it.
    pub async fn add_to_cart(&self, owner_id: &str, sku_id: &str, quantity: u32) -> ControllerState {
        self.modify(|s| {
            s.begin_sync();
            s.last_error = None;
        });

        let result = self
            .inner
            .repository
            .add_to_cart(owner_id, sku_id, quantity)
            .await;
        match &result {
            Ok(_) => info!("Added {} x{} to cart {}", sku_id, quantity, owner_id),
            Err(e) => warn!("Failed to add {} to cart {}: {}", sku_id, owner_id, e),
        }

        self.modify(|s| {
            match result {
                Ok(cart) => s.cart = Some(cart),
                Err(e) => s.last_error = Some(error_message(&e)),
            }
            s.end_sync();
        })
    }

    /// Set the line's quantity locally and schedule a debounced remote
    /// update for (`owner_id`, `sku_id`).
    ///
    /// Totals are left as they are until the server answers.
    pub async fn update_quantity(
        &self,
        owner_id: &str,
        sku_id: &str,
        quantity: u32,
    ) -> ControllerState {
        let snapshot = self.modify_if(|s| {
            match s.cart.as_mut().and_then(|c| c.line_mut(sku_id)) {
                Some(line) => {
                    line.quantity = quantity;
                    true
                }
                None => false,
            }
        });
        self.schedule_update(owner_id, sku_id, quantity);
        snapshot
    }

    /// Remove the line locally, then on the server. A rejected delete
    /// restores the cart exactly as it was before the call. Missing cart or
    /// line is a no-op.
    pub async fn remove_item(&self, owner_id: &str, sku_id: &str) -> ControllerState {
        let mut previous: Option<Cart> = None;
        let snapshot = self.modify_if(|s| {
            let Some(cart) = s.cart.as_mut() else {
                return false;
            };
            let Some(idx) = cart.lines.iter().position(|l| l.sku_id == sku_id) else {
                return false;
            };
            previous = Some(cart.clone());
            let line = cart.lines.remove(idx);
            cart.total_price -= line.subtotal();
            cart.total_quantity = cart.total_quantity.saturating_sub(u64::from(line.quantity));
            s.begin_sync();
            true
        });

        let Some(previous) = previous else {
            debug!("{} not in cart {}; nothing to remove", sku_id, owner_id);
            return snapshot;
        };

        let result = self
            .inner
            .repository
            .remove_from_cart(owner_id, sku_id)
            .await;

        self.modify(|s| {
            match result {
                Ok(cart) => {
                    info!("Removed {} from cart {}", sku_id, owner_id);
                    s.cart = Some(cart);
                }
                Err(e) => {
                    warn!("Failed to remove {} from cart {}, rolling back: {}", sku_id, owner_id, e);
                    s.cart = Some(previous);
                    s.last_error = Some(error_message(&e));
                }
            }
            s.end_sync();
        })
    }

    fn schedule_update(&self, owner_id: &str, sku_id: &str, quantity: u32) {
        let key = DebounceKey::new(owner_id, sku_id);
        let delay = self.inner.config.debounce;
        let controller = self.clone();
        let task_key = key.clone();

        let replaced = self.inner.pending.schedule(key, move |generation| {
            tokio::spawn(async move {
                sleep(delay).await;
                controller.fire_update(task_key, generation, quantity).await;
            })
        });
        debug!(
            "Scheduled quantity {} for {}/{} in {:?}{}",
            quantity,
            owner_id,
            sku_id,
            delay,
            if replaced { " (replaced pending)" } else { "" }
        );
    }

    async fn fire_update(&self, key: DebounceKey, generation: u64, quantity: u32) {
        // Mark the sync before giving up the table entry so `settled` never
        // sees an idle gap between the two.
        let mut rollback: Option<Cart> = None;
        self.modify(|s| {
            rollback = s.cart.clone();
            s.begin_sync();
        });
        if !self.inner.pending.claim(&key, generation) {
            self.modify(|s| s.end_sync());
            return;
        }

        debug!("Sending quantity {} for {}/{}", quantity, key.owner_id, key.sku_id);
        let result = self
            .inner
            .repository
            .update_cart_item(&key.owner_id, &key.sku_id, quantity)
            .await;

        self.modify(|s| {
            match result {
                Ok(cart) => s.cart = Some(cart),
                Err(e) => {
                    warn!(
                        "Failed to update {}/{} to {}, rolling back: {}",
                        key.owner_id, key.sku_id, quantity, e
                    );
                    s.cart = rollback;
                    s.last_error = Some(error_message(&e));
                }
            }
            s.end_sync();
        });
    }

    fn modify(&self, f: impl FnOnce(&mut ControllerState)) -> ControllerState {
        self.modify_if(|s| {
            f(s);
            true
        })
    }

    /// Apply `f`; subscribers are only notified when it returns true.
    fn modify_if(&self, f: impl FnOnce(&mut ControllerState) -> bool) -> ControllerState {
        let mut snapshot = ControllerState::default();
        self.inner.state.send_if_modified(|s| {
            let modified = f(s);
            snapshot = s.clone();
            modified
        });
        snapshot
    }
}

fn error_message(err: &RepositoryError) -> String {
    err.message().to_string()
}
