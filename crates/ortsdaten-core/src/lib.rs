pub mod app_config;
pub mod catalog;
pub mod config;
pub mod geo;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("commercial places source enabled but ORTSDATEN_GOOGLE_API_KEY is not set")]
    MissingCommercialKey,
}
