pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use app::resources::Resource;
pub use config::{credentials::Credentials, toml_config::NodeConfig};
pub use core::{engine::NodeEngine, transport::AfterShipClient, trigger::WebhookTrigger};
pub use utils::error::{AfterShipError, Result};
