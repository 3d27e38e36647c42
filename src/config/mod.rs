//! Configuration system
//!
//! Loads ~/.config/nddf/config.yaml with support for:
//! - Server URL and API base path (injectable per deployment)
//! - Optional request timeout and User-Agent
//! - NDDF_* environment variable overrides

mod client_config;
pub mod validation;

pub use client_config::{ClientConfig, ENV_BASE_PATH, ENV_SERVER, ENV_TIMEOUT_SECS};
pub(crate) use client_config::normalize_base_path;
pub use validation::{validate_config, validate_config_result, ValidationError};
