use anyhow::{Context, Result};
use tracing::debug;

use storefront_cart::{
    HttpCartRepository, InMemoryCartRepository, ProductFilter, ProductRepository, StorefrontConfig,
};

use super::render::{render_product, render_products};
use crate::cli::ProductAction;

pub async fn run_products(config: &StorefrontConfig, builtin: bool, action: ProductAction) -> Result<()> {
    let repository: Box<dyn ProductRepository> = if builtin {
        debug!("Using the built-in sample catalog");
        Box::new(InMemoryCartRepository::with_default_catalog())
    } else {
        let repository = HttpCartRepository::new(config.http_repository_config())
            .context("Failed to set up the storefront API client")?;
        debug!("Product API at {}", repository.base_url());
        Box::new(repository)
    };

    match action {
        ProductAction::List {
            query,
            category,
            tags,
            min_price,
            max_price,
            sort,
            page,
            page_size,
        } => {
            let filter = ProductFilter {
                query,
                category,
                tags,
                min_price,
                max_price,
                sort,
            };
            let page = repository
                .list_products(&filter, page as usize, page_size as usize)
                .await
                .context("Failed to list products")?;
            print!("{}", render_products(&page));
        }
        ProductAction::Show { id } => {
            let product = repository
                .get_product(&id)
                .await
                .with_context(|| format!("Failed to load product {}", id))?;
            print!("{}", render_product(&product));
        }
    }
    Ok(())
}
