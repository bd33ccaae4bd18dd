use anyhow::Result;
use tracing::debug;

use storefront_cart::{CartLine, FileKeyValueStore, LineSnapshot, LocalCartStore, StorefrontConfig};

use super::render::render_cart;
use crate::cli::LocalAction;

pub fn run_local(config: &StorefrontConfig, owner_id: &str, action: LocalAction) -> Result<()> {
    let store = LocalCartStore::new(FileKeyValueStore::new(config.carts_dir()));
    debug!("Local cart store at {}", store.backend().dir().display());

    let cart = match action {
        LocalAction::Show => store.read(owner_id),
        LocalAction::Add {
            sku,
            quantity,
            name,
            price,
        } => {
            let mut line = CartLine::new(sku.as_str(), quantity);
            if name.is_some() || price.is_some() {
                line = line.with_snapshot(LineSnapshot {
                    name: name.unwrap_or_else(|| sku.clone()),
                    image_url: String::new(),
                    unit_price: price.unwrap_or(0.0),
                    attributes: Default::default(),
                });
            }
            store.add_line(owner_id, line)
        }
        LocalAction::Update { sku, quantity } => store.update_line(owner_id, &sku, quantity)?,
        LocalAction::Remove { sku } => store.remove_line(owner_id, &sku),
        LocalAction::Clear => store.clear(owner_id),
    };

    print!("{}", render_cart(&cart));
    Ok(())
}
