//! Configuration validation
//!
//! Validates a client configuration before any request is attempted:
//! - Server is an absolute http(s) URL without a path
//! - Base path, once normalized, is a plain path (no query, fragment or spaces)
//! - Timeout, when set, is non-zero

use super::client_config::{normalize_base_path, ClientConfig};
use crate::NddfError;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a client configuration
pub fn validate_config(config: &ClientConfig) -> ValidationResult {
    let mut errors = Vec::new();

    let server = config.server.trim();
    if server.is_empty() {
        errors.push(ValidationError::new("server", "Server URL cannot be empty"));
    } else {
        match server.split_once("://") {
            Some((scheme, rest)) => {
                if scheme != "http" && scheme != "https" {
                    errors.push(ValidationError::new(
                        "server",
                        format!("Unsupported scheme '{}' (expected http or https)", scheme),
                    ));
                }
                let host = rest.trim_end_matches('/');
                if host.is_empty() {
                    errors.push(ValidationError::new("server", "Server URL has no host"));
                } else if host.contains('/') {
                    errors.push(ValidationError::new(
                        "server",
                        "Server URL must not contain a path; use base_path instead",
                    ));
                }
            }
            None => errors.push(ValidationError::new(
                "server",
                format!("Server URL must start with http:// or https://, got '{}'", server),
            )),
        }
    }

    // "api", "/api/" and "" are all accepted; see normalize_base_path
    let base_path = normalize_base_path(&config.base_path);
    if base_path.contains(['?', '#']) || base_path.chars().any(char::is_whitespace) {
        errors.push(ValidationError::new(
            "base_path",
            format!(
                "Base path must be a plain path without query, fragment or spaces, got '{}'",
                config.base_path
            ),
        ));
    }

    if config.timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "timeout_secs",
            "Timeout must be greater than zero (omit it to disable)",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate and convert the error list into a single [`NddfError::Config`]
pub fn validate_config_result(config: &ClientConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        NddfError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
