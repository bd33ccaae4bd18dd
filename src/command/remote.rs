use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use storefront_cart::{CartController, ControllerState, HttpCartRepository, StorefrontConfig};

use super::render::render_state;
use crate::cli::RemoteAction;

pub async fn run_remote(config: &StorefrontConfig, owner_id: &str, action: RemoteAction) -> Result<()> {
    let repository = HttpCartRepository::new(config.http_repository_config())
        .context("Failed to set up the cart API client")?;
    debug!("Cart API at {}", repository.base_url());

    let controller = CartController::with_config(Arc::new(repository), config.controller_config());

    let state = match action {
        RemoteAction::Show => controller.fetch_cart(owner_id).await,
        RemoteAction::Add { sku, quantity } => controller.add_to_cart(owner_id, &sku, quantity).await,
        RemoteAction::Update { sku, quantity } => {
            // Load first so the optimistic edit has a line to apply to.
            let loaded = controller.fetch_cart(owner_id).await;
            if loaded.last_error.is_some() {
                loaded
            } else {
                controller.update_quantity(owner_id, &sku, quantity).await;
                controller.settled().await
            }
        }
        RemoteAction::Remove { sku } => {
            let loaded = controller.fetch_cart(owner_id).await;
            if loaded.last_error.is_some() {
                loaded
            } else {
                controller.remove_item(owner_id, &sku).await
            }
        }
    };

    finish(state)
}

fn finish(state: ControllerState) -> Result<()> {
    print!("{}", render_state(&state));
    match state.last_error {
        Some(err) => anyhow::bail!("Cart sync failed: {}", err),
        None => Ok(()),
    }
}
