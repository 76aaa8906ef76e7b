pub mod config;
pub mod config_loader;
pub mod error;
pub mod template;
pub mod traits;

pub use config::*;
pub use config_loader::{CONFIG_FILENAME, ConfigLoader, OptionResolver};
pub use error::*;
pub use traits::*;
