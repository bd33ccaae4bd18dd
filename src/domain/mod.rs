//! Cart types shared by the local store, the repositories and the controller.
//!
//! The JSON shape matches what the storefront API sends and what the
//! device-local store persists:
//!
//! ```json
//! {"uid":"1","items":[{"skuId":"sku_p1_r_s","quantity":2,"addedAt":1732260000000,
//!   "product":{"name":"Red S","image":"","price":49,"attributes":{"color":"red"}}}],
//!  "totalPrice":98,"totalQuantity":2}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Denormalized product/SKU data captured when a line was added or last
/// refreshed by the server. Display-only; never authoritative pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub name: String,
    #[serde(rename = "image", default)]
    pub image_url: String,
    #[serde(rename = "price", default)]
    pub unit_price: f64,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// One SKU entry in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub sku_id: String,
    pub quantity: u32,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub added_at: i64,
    #[serde(rename = "product", default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<LineSnapshot>,
}

impl CartLine {
    /// Create a line stamped with the current time and no snapshot.
    pub fn new(sku_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku_id: sku_id.into(),
            quantity,
            added_at: chrono::Utc::now().timestamp_millis(),
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: LineSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Unit price from the snapshot, 0 when none was captured.
    pub fn unit_price(&self) -> f64 {
        self.snapshot.as_ref().map_or(0.0, |s| s.unit_price)
    }

    /// Contribution of this line to the cart total.
    pub fn subtotal(&self) -> f64 {
        self.unit_price() * f64::from(self.quantity)
    }
}

/// A cart owned by one user. `lines` keep insertion order and hold at most
/// one line per SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "uid")]
    pub owner_id: String,
    #[serde(rename = "items", default)]
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub total_price: f64,
    #[serde(default)]
    pub total_quantity: u64,
}

impl Cart {
    pub fn empty(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            lines: Vec::new(),
            total_price: 0.0,
            total_quantity: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_mut(&mut self, sku_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.sku_id == sku_id)
    }

    /// Merge `line` into the cart: an existing line for the same SKU gains
    /// the quantity, otherwise the line is appended. Totals are recomputed.
    pub fn merge_line(&mut self, line: CartLine) {
        match self.line_mut(&line.sku_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => self.lines.push(line),
        }
        self.recompute_totals();
    }

    /// Remove the line for `sku_id`, returning it. Totals are recomputed.
    pub fn remove_line(&mut self, sku_id: &str) -> Option<CartLine> {
        let idx = self.lines.iter().position(|l| l.sku_id == sku_id)?;
        let removed = self.lines.remove(idx);
        self.recompute_totals();
        Some(removed)
    }

    pub fn recompute_totals(&mut self) {
        self.total_quantity = self.lines.iter().map(|l| u64::from(l.quantity)).sum();
        self.total_price = self.lines.iter().map(CartLine::subtotal).sum();
    }
}
