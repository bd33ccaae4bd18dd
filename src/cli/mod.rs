mod args;

pub use args::{Cli, Commands, LocalAction, ProductAction, RemoteAction};
