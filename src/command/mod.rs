mod local;
mod products;
mod remote;
mod render;

pub use local::run_local;
pub use products::run_products;
pub use remote::run_remote;
