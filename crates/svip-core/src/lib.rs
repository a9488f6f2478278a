pub mod app_config;
pub mod config;
pub mod error;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use stores::{load_store_directory, Store, StoreDirectory};
