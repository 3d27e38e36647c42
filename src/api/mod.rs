//! NDDF service API client
//!
//! One async method per remote operation, all relative to a configurable base path
//! (default `/api`):
//! - POST /upload - multipart workbook upload
//! - POST /sheet-data - multipart `file_id` + `sheet_name`
//! - POST /compute - JSON `{config, data}`
//! - POST /export - JSON `{config, results}`, binary response
//! - GET /columns-info - column role metadata

mod client;
mod files;
pub mod models;

pub use client::{ApiClient, DEFAULT_BASE_PATH};
pub use files::{guess_mime, safe_file_name, ExportedFile, UploadFile, DEFAULT_EXPORT_FILE_NAME};
