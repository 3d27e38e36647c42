//! nddf-client - HTTP client for the NDDF shadow price service
//!
//! The service computes efficiency scores, shadow prices and marginal abatement
//! costs with a non-radial directional distance function (NDDF) dual model. This
//! crate wraps its HTTP API and ships the `nddf` command-line tool.
//!
//! # Architecture
//!
//! - **api**: `ApiClient` with one async method per endpoint, plus typed models
//! - **config**: Server URL / base path configuration (YAML + environment)
//! - **error**: Error type shared by every operation
//! - **logging**: tracing subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use nddf_client::api::{ApiClient, UploadFile};
//!
//! # async fn run() -> nddf_client::Result<()> {
//! let client = ApiClient::new("http://localhost:8000");
//! let upload = client.upload_file(UploadFile::from_path("panel.xlsx").await?).await?;
//! let columns = client.get_columns_info().await?;
//! println!("{upload}\n{columns}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod logging;

// Re-exports
pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{NddfError, Result};
