//! Typed views of the service's payloads
//!
//! The client methods treat payloads as opaque JSON. These types describe what the
//! NDDF service actually sends and accepts, for callers that want structure:
//! serialize them as request payloads, or decode responses with [`from_value`].

use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Decode a JSON value returned by [`super::ApiClient`] into a typed model
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// One input/output column of the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    /// Direction vector component (1 = scaled, 0 = held fixed)
    pub direction: f64,
    pub weight: f64,
}

impl ColumnConfig {
    pub fn new(name: impl Into<String>, direction: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            direction,
            weight,
        }
    }
}

/// Model configuration sent with /compute and /export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeConfig {
    pub input_cols: Vec<ColumnConfig>,
    pub output_cols: Vec<ColumnConfig>,
    pub undesired_cols: Vec<ColumnConfig>,
    #[serde(default = "default_id_col")]
    pub id_col: String,
    #[serde(default = "default_year_col")]
    pub year_col: String,
    /// Variable returns to scale; constant returns otherwise
    #[serde(rename = "isVRS", default)]
    pub is_vrs: bool,
}

fn default_id_col() -> String {
    "id".to_string()
}

fn default_year_col() -> String {
    "year".to_string()
}

impl ComputeConfig {
    /// "VRS" or "CRS"
    pub fn mode(&self) -> &'static str {
        if self.is_vrs {
            "VRS"
        } else {
            "CRS"
        }
    }
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            input_cols: Vec::new(),
            output_cols: Vec::new(),
            undesired_cols: Vec::new(),
            id_col: default_id_col(),
            year_col: default_year_col(),
            is_vrs: false,
        }
    }
}

/// Per-DMU result of the computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeResult {
    pub id: Value,
    pub year: Value,
    #[serde(rename = "Efficiency_NDDF")]
    pub efficiency: f64,
    #[serde(rename = "Zeta")]
    pub zeta: f64,
    #[serde(default)]
    pub prices: BTreeMap<String, f64>,
    #[serde(default)]
    pub mac: BTreeMap<String, f64>,
}

/// Response of /compute
///
/// A failed computation is still a 200 response with `success == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub results: Option<Vec<ComputeResult>>,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub computed_count: usize,
}

/// Response of /upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(alias = "file_id")]
    pub file_id: String,
    #[serde(default)]
    pub sheets: Vec<String>,
    #[serde(default)]
    pub current_sheet: Option<String>,
    #[serde(default)]
    pub columns: Vec<Value>,
    #[serde(default)]
    pub preview: Vec<Value>,
    #[serde(default)]
    pub total_rows: usize,
}

/// Response of /sheet-data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetData {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub sheet_name: Option<String>,
    #[serde(default)]
    pub columns: Vec<Value>,
    #[serde(default)]
    pub preview: Vec<Value>,
    #[serde(default)]
    pub total_rows: usize,
    /// Every row as a column -> value object
    #[serde(default)]
    pub data: Vec<Value>,
}

/// Response of /columns-info
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsInfo {
    #[serde(default)]
    pub input_types: Vec<String>,
    #[serde(default)]
    pub output_types: Vec<String>,
    #[serde(default)]
    pub undesired_types: Vec<String>,
    #[serde(default)]
    pub default_config: Option<ComputeConfig>,
}

/// Response of /progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
}

impl Progress {
    /// Completed fraction in 0.0..=1.0; 0.0 when nothing is queued
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64 / self.total as f64).min(1.0)
        }
    }
}

/// Response of `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub message: String,
    pub version: String,
}
