use clap::{Parser, Subcommand};
use storefront_cart::catalog::{ProductSort, DEFAULT_PAGE_SIZE};
use storefront_cart::config::DEFAULT_OWNER_ID;

/// Storefront cart CLI - local cart store, remote cart sync and product catalog
#[derive(Parser)]
#[command(name = "storefront-cart")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for on-disk state. Defaults to ~/.storefront
    #[arg(long, global = true)]
    pub cache_dir: Option<String>,

    /// Storefront API root, e.g. http://localhost:3000/api/v1
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Quiet period before a quantity change is sent, in milliseconds
    #[arg(long, global = true)]
    pub debounce_ms: Option<u64>,

    /// Cart owner id
    #[arg(short, long, global = true, default_value = DEFAULT_OWNER_ID)]
    pub uid: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Work with the cart stored on this device
    Local {
        #[command(subcommand)]
        action: LocalAction,
    },
    /// Work with the cart held by the storefront API
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
    /// Browse the product catalog
    Products {
        /// Use the built-in sample catalog instead of the storefront API
        #[arg(long, global = true)]
        builtin: bool,

        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
pub enum LocalAction {
    /// Print the stored cart
    Show,
    /// Add a SKU, merging with an existing line
    Add {
        sku: String,

        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,

        /// Display name stored with the line
        #[arg(long)]
        name: Option<String>,

        /// Unit price stored with the line
        #[arg(long)]
        price: Option<f64>,
    },
    /// Set the quantity of an existing line
    Update { sku: String, quantity: u32 },
    /// Remove a line
    Remove { sku: String },
    /// Delete the stored cart
    Clear,
}

#[derive(Subcommand)]
pub enum RemoteAction {
    /// Fetch and print the server cart
    Show,
    /// Add a SKU on the server
    Add {
        sku: String,

        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Change a line's quantity (debounced, optimistic)
    Update {
        sku: String,

        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Remove a line (optimistic, rolled back on failure)
    Remove { sku: String },
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products matching the given criteria
    List {
        /// Case-insensitive name substring
        #[arg(long)]
        query: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// Required tag; repeat or comma-separate for several
        #[arg(long = "tag", value_delimiter = ',')]
        tags: Vec<String>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        /// default, price_asc, price_desc or sales
        #[arg(long, default_value_t = ProductSort::Default)]
        sort: ProductSort,

        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE as u64, value_parser = clap::value_parser!(u64).range(1..))]
        page_size: u64,
    },
    /// Show one product with its SKUs
    Show { id: String },
}
