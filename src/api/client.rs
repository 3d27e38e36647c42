//! HTTP client for the NDDF computation service

use super::files::{ExportedFile, UploadFile};
use crate::config::{normalize_base_path, validate_config_result, ClientConfig};
use crate::{NddfError, Result};
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Default API path prefix
pub const DEFAULT_BASE_PATH: &str = "/api";

/// Client for the NDDF service API
///
/// Cheap to clone: clones share one connection pool. Every method issues exactly
/// one request and hands back the decoded body or the error.
#[derive(Debug, Clone)]
pub struct ApiClient {
    server: String,
    base_path: String,
    client: reqwest::Client,
}

/// JSON body for /compute
#[derive(Debug, Serialize)]
struct ComputeRequest<'a, C, D> {
    config: &'a C,
    data: &'a D,
}

/// JSON body for /export
#[derive(Debug, Serialize)]
struct ExportRequest<'a, C, R> {
    config: &'a C,
    results: &'a R,
}

/// Error body produced by the service (FastAPI `HTTPException`)
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: Value,
}

impl ApiClient {
    /// Create a client for `server` (e.g. `http://localhost:8000`) using the `/api` base path
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into().trim_end_matches('/').to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from a validated config
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        validate_config_result(config)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(ref agent) = config.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        Ok(Self {
            server: config.server_url().to_string(),
            base_path: normalize_base_path(&config.base_path),
            client: builder.build()?,
        })
    }

    /// Replace the API base path
    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = normalize_base_path(base_path);
        self
    }

    /// Use a preconfigured reqwest client (proxies, TLS roots, ...)
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// URL of an API endpoint, e.g. `endpoint("upload")` -> `http://host/api/upload`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}/{}",
            self.server,
            self.base_path,
            path.trim_start_matches('/')
        )
    }

    /// URL relative to the server root, outside the API base path
    fn root_url(&self, path: &str) -> String {
        format!("{}/{}", self.server, path.trim_start_matches('/'))
    }

    /// Upload a workbook as multipart form data (field `file`)
    pub async fn upload_file(&self, file: UploadFile) -> Result<Value> {
        let url = self.endpoint("upload");
        debug!(
            url = %url,
            file_name = %file.file_name(),
            size = file.len(),
            "Uploading file"
        );

        let form = Form::new().part("file", file.into_part()?);
        let response = self.send("upload file", self.client.post(&url).multipart(form)).await?;
        Self::json(response).await
    }

    /// Fetch the rows of one sheet of a previously uploaded workbook
    pub async fn get_sheet_data(&self, file_id: &str, sheet_name: &str) -> Result<Value> {
        let url = self.endpoint("sheet-data");
        debug!(url = %url, file_id, sheet_name, "Requesting sheet data");

        let form = Form::new()
            .text("file_id", file_id.to_string())
            .text("sheet_name", sheet_name.to_string());
        let response = self.send("get sheet data", self.client.post(&url).multipart(form)).await?;
        Self::json(response).await
    }

    /// Run the computation; body is exactly `{"config": ..., "data": ...}`
    pub async fn compute<C, D>(&self, config: &C, data: &D) -> Result<Value>
    where
        C: Serialize,
        D: Serialize,
    {
        let url = self.endpoint("compute");
        debug!(url = %url, "Submitting computation");

        let body = ComputeRequest { config, data };
        let response = self.send("compute", self.client.post(&url).json(&body)).await?;
        Self::json(response).await
    }

    /// Export results; the response body is returned untouched
    pub async fn export_results<C, R>(&self, config: &C, results: &R) -> Result<ExportedFile>
    where
        C: Serialize,
        R: Serialize,
    {
        let url = self.endpoint("export");
        debug!(url = %url, "Requesting export");

        let body = ExportRequest { config, results };
        let response = self.send("export results", self.client.post(&url).json(&body)).await?;

        let file = ExportedFile::from_response(response).await?;
        debug!(
            size = file.len(),
            file_name = file.file_name.as_deref().unwrap_or("-"),
            "Export received"
        );
        Ok(file)
    }

    /// Describe the column roles the service understands
    pub async fn get_columns_info(&self) -> Result<Value> {
        let url = self.endpoint("columns-info");
        debug!(url = %url, "Requesting columns info");

        let response = self.send("get columns info", self.client.get(&url)).await?;
        Self::json(response).await
    }

    /// Progress of the running computation (`GET /progress`, outside the base path)
    pub async fn get_progress(&self) -> Result<Value> {
        let url = self.root_url("progress");
        debug!(url = %url, "Requesting progress");

        let response = self.send("get progress", self.client.get(&url)).await?;
        Self::json(response).await
    }

    /// Service banner (`GET /`)
    pub async fn server_info(&self) -> Result<Value> {
        let url = self.root_url("");
        debug!(url = %url, "Requesting server info");

        let response = self.send("get server info", self.client.get(&url)).await?;
        Self::json(response).await
    }

    /// Send a request and turn non-success statuses into [`NddfError::Api`]
    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(operation, status = %status, "Response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        warn!(operation, status = %status, "Request failed: {}", message);

        Err(NddfError::Api { status, message })
    }

    async fn json(response: Response) -> Result<Value> {
        let value: Value = response.json().await?;
        Ok(value)
    }
}

/// Pull a readable message out of an error body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            detail: Value::String(detail),
        }) => detail,
        // Validation failures carry a list of problems
        Ok(ErrorResponse { detail }) => detail.to_string(),
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => "Unknown error".to_string(),
    }
}
