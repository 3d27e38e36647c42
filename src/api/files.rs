//! File payloads: workbook uploads and exported spreadsheets

use crate::Result;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::Part;
use reqwest::Response;
use std::path::Path;

/// File name used when the server does not suggest one
pub const DEFAULT_EXPORT_FILE_NAME: &str = "NDDF_ShadowPrices.xlsx";

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const XLS_MIME: &str = "application/vnd.ms-excel";
const CSV_MIME: &str = "text/csv";
const OCTET_STREAM: &str = "application/octet-stream";

/// A file to send to the upload endpoint
#[derive(Debug, Clone)]
pub struct UploadFile {
    file_name: String,
    bytes: Vec<u8>,
    mime: String,
}

impl UploadFile {
    /// Wrap in-memory bytes; the MIME type is guessed from the file name
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let file_name = file_name.into();
        let mime = guess_mime(&file_name).to_string();
        Self {
            file_name,
            bytes: bytes.into(),
            mime,
        }
    }

    /// Read a file from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                crate::NddfError::Other(format!("Not a file path: {}", path.display()))
            })?;

        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, bytes))
    }

    /// Override the guessed MIME type
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn into_part(self) -> Result<Part> {
        let part = Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)?;
        Ok(part)
    }
}

/// Binary body returned by the export endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    /// Raw response body
    pub bytes: Vec<u8>,
    /// `Content-Type` header, if sent
    pub content_type: Option<String>,
    /// File name from `Content-Disposition`, if sent
    pub file_name: Option<String>,
}

impl ExportedFile {
    pub(crate) async fn from_response(response: Response) -> Result<Self> {
        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_disposition_file_name);

        let bytes = response.bytes().await?.to_vec();

        Ok(Self {
            bytes,
            content_type,
            file_name,
        })
    }

    /// Server-provided file name reduced to a bare name, or [`DEFAULT_EXPORT_FILE_NAME`]
    ///
    /// Never contains a directory part, so it is safe to join onto an output directory.
    pub fn suggested_file_name(&self) -> &str {
        self.file_name
            .as_deref()
            .and_then(safe_file_name)
            .unwrap_or(DEFAULT_EXPORT_FILE_NAME)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the bytes to `path`, creating parent directories
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tracing::info!(path = %path.display(), size = self.bytes.len(), "Saving export");
        tokio::fs::write(path, &self.bytes).await?;
        Ok(())
    }
}

/// Guess a MIME type from a file extension
pub fn guess_mime(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    match extension.as_deref() {
        Some("xlsx") => XLSX_MIME,
        Some("xls") => XLS_MIME,
        Some("csv") => CSV_MIME,
        _ => OCTET_STREAM,
    }
}

/// Extract the file name from a Content-Disposition value
///
/// Handles `filename=a.xlsx`, quoted values (which may contain `;`) and the
/// RFC 5987 `filename*=UTF-8''...` form, which wins when both are present.
/// The result has passed through [`safe_file_name`].
fn parse_disposition_file_name(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in split_params(value) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.eq_ignore_ascii_case("filename*") {
            extended = decode_ext_value(raw.trim());
        } else if key.eq_ignore_ascii_case("filename") {
            plain = Some(unquote(raw.trim()));
        }
    }

    extended
        .as_deref()
        .and_then(safe_file_name)
        .or_else(|| plain.as_deref().and_then(safe_file_name))
        .map(str::to_owned)
}

/// Split header parameters on `;`, ignoring separators inside quotes
fn split_params(value: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(value[start..].trim());
    params
}

fn unquote(raw: &str) -> String {
    match raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        Some(inner) => {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else {
                    out.push(c);
                }
            }
            out
        }
        None => raw.to_string(),
    }
}

/// Decode `charset'lang'percent-encoded`; only UTF-8 and ASCII charsets are understood
fn decode_ext_value(raw: &str) -> Option<String> {
    let mut parts = raw.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;

    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("us-ascii") {
        return None;
    }
    urlencoding::decode(encoded).ok().map(|name| name.into_owned())
}

/// Reduce a server-supplied name to a bare file name
///
/// Directory parts (either separator) are dropped. Names that are empty, `.`,
/// `..`, or contain drive letters or control characters are refused.
pub fn safe_file_name(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next()?.trim();

    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    if base.contains(':') || base.chars().any(char::is_control) {
        return None;
    }
    Some(base)
}
