//! nddf - command-line client for the NDDF shadow price service
//!
//! Main entry point for the nddf CLI.

mod commands;

use anyhow::Context;
use clap::Parser;
use commands::{Cli, Commands};
use nddf_client::api::models::{self, ComputeResponse, Progress, UploadResponse};
use nddf_client::api::UploadFile;
use nddf_client::{ApiClient, ClientConfig, NddfError};
use serde_json::Value;
use std::io::{self, Write};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(e) = nddf_client::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> nddf_client::Result<()> {
    let Cli {
        config: config_flag,
        server,
        base_path,
        command,
    } = cli;
    let explicit_config = config_flag.is_some();
    let config_path = config_flag.unwrap_or_else(ClientConfig::default_path);

    let command = match command {
        Commands::Init { force } => return handle_init_command(&config_path, force),
        other => other,
    };

    let mut config = if explicit_config {
        ClientConfig::load(&config_path)?
    } else {
        ClientConfig::load_or_default(&config_path)?
    };
    apply_overrides(&mut config, server, base_path)?;

    let client = ApiClient::from_config(&config)?;

    tracing::info!(api = %config.api_base_url(), "Client ready");

    execute(&client, command, &mut io::stdout().lock(), Path::new("")).await
}

/// Run one remote command, writing its report to `out`
///
/// Exports without `--output` land in `export_dir` under the server-suggested name.
async fn execute<W: Write>(
    client: &ApiClient,
    command: Commands,
    out: &mut W,
    export_dir: &Path,
) -> nddf_client::Result<()> {
    match command {
        Commands::Init { .. } => {}

        Commands::Upload { file } => {
            let upload = UploadFile::from_path(&file).await?;
            let response = client.upload_file(upload).await?;

            if let Ok(summary) = models::from_value::<UploadResponse>(response.clone()) {
                tracing::info!(
                    file_id = %summary.file_id,
                    sheets = summary.sheets.len(),
                    rows = summary.total_rows,
                    "Upload complete"
                );
            }
            write_json(out, &response)?;
        }

        Commands::Sheet {
            file_id,
            sheet_name,
        } => {
            let response = client.get_sheet_data(&file_id, &sheet_name).await?;
            write_json(out, &response)?;
        }

        Commands::Compute { config, data } => {
            let model_config = read_json(&config)?;
            let rows = unwrap_field(read_json(&data)?, "data");

            let response = client.compute(&model_config, &rows).await?;
            write_json(out, &response)?;

            // The service reports compute failures inside a 200 response
            let outcome: ComputeResponse = models::from_value(response)?;
            if !outcome.success {
                return Err(NddfError::Other(outcome.message));
            }
            tracing::info!(
                total = outcome.total_count,
                computed = outcome.computed_count,
                "Computation finished"
            );
        }

        Commands::Export {
            config,
            results,
            output,
        } => {
            let model_config = read_json(&config)?;
            let results = unwrap_field(read_json(&results)?, "results");

            let exported = client.export_results(&model_config, &results).await?;
            let output = output.unwrap_or_else(|| export_dir.join(exported.suggested_file_name()));
            exported.save(&output).await?;

            writeln!(out, "Saved {} bytes to {}", exported.len(), output.display())?;
        }

        Commands::Columns => {
            let response = client.get_columns_info().await?;
            write_json(out, &response)?;
        }

        Commands::Progress => {
            let response = client.get_progress().await?;
            let progress: Progress = models::from_value(response)?;
            writeln!(
                out,
                "{}/{} ({:.0}%)",
                progress.current,
                progress.total,
                progress.fraction() * 100.0
            )?;
        }
    }

    Ok(())
}

fn handle_init_command(path: &Path, force: bool) -> nddf_client::Result<()> {
    if path.exists() && !force {
        return Err(NddfError::Config(format!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }

    ClientConfig::new().save(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// NDDF_* environment first, then command-line flags
fn apply_overrides(
    config: &mut ClientConfig,
    server: Option<String>,
    base_path: Option<String>,
) -> nddf_client::Result<()> {
    config.apply_env()?;

    if let Some(server) = server {
        config.server = server;
    }
    if let Some(base_path) = base_path {
        config.base_path = base_path;
    }

    Ok(())
}

fn read_json(path: &Path) -> nddf_client::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    Ok(value)
}

/// Accept either a bare payload or a previous response wrapping it under `field`
fn unwrap_field(value: Value, field: &str) -> Value {
    match value {
        Value::Object(mut map) if map.get(field).is_some_and(Value::is_array) => {
            map.remove(field).unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn write_json<W: Write>(out: &mut W, value: &Value) -> nddf_client::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_client() -> (MockServer, ApiClient) {
        let server = MockServer::start().await;
        let client = ApiClient::new(server.uri());
        (server, client)
    }

    fn write_input(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_compute_failure_is_an_error() {
        let (server, client) = mock_client().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/api/compute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "计算失败: singular matrix",
                "results": null,
                "total_count": 3,
                "computed_count": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let command = Commands::Compute {
            config: write_input(&dir, "config.json", &json!({"isVRS": false})),
            data: write_input(&dir, "sheet.json", &json!({"data": [{"id": 1}]})),
        };
        let mut out = Vec::new();
        let err = execute(&client, command, &mut out, dir.path()).await.unwrap_err();

        assert!(matches!(err, NddfError::Other(ref msg) if msg == "计算失败: singular matrix"));
        // The response is still shown before failing
        let printed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["total_count"], 3);
    }

    #[tokio::test]
    async fn test_compute_success() {
        let (server, client) = mock_client().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/api/compute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "ok",
                "results": [],
                "total_count": 0,
                "computed_count": 0
            })))
            .mount(&server)
            .await;

        let command = Commands::Compute {
            config: write_input(&dir, "config.json", &json!({})),
            data: write_input(&dir, "rows.json", &json!([])),
        };
        let mut out = Vec::new();
        execute(&client, command, &mut out, dir.path()).await.unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\"success\": true"));
    }

    #[tokio::test]
    async fn test_export_saves_under_suggested_name() {
        let (server, client) = mock_client().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/api/export"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"PK\x03\x04".to_vec())
                    .insert_header(
                        "content-disposition",
                        "attachment; filename=../../NDDF_ShadowPrices_VRS.xlsx",
                    ),
            )
            .expect(1)
            .mount(&server)
            .await;

        let export_dir = dir.path().join("out");
        let command = Commands::Export {
            config: write_input(&dir, "config.json", &json!({"isVRS": true})),
            results: write_input(&dir, "results.json", &json!({"success": true, "results": []})),
            output: None,
        };
        let mut out = Vec::new();
        execute(&client, command, &mut out, &export_dir).await.unwrap();

        let saved = export_dir.join("NDDF_ShadowPrices_VRS.xlsx");
        assert_eq!(std::fs::read(&saved).unwrap(), b"PK\x03\x04");
        assert!(!dir.path().join("NDDF_ShadowPrices_VRS.xlsx").exists());
        assert!(String::from_utf8(out).unwrap().starts_with("Saved 4 bytes to "));
    }

    #[tokio::test]
    async fn test_export_explicit_output() {
        let (server, client) = mock_client().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/api/export"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let target = dir.path().join("mine.xlsx");
        let command = Commands::Export {
            config: write_input(&dir, "config.json", &json!({})),
            results: write_input(&dir, "results.json", &json!([])),
            output: Some(target.clone()),
        };
        execute(&client, command, &mut Vec::new(), dir.path()).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), vec![1u8, 2, 3]);
    }

    #[tokio::test]
    async fn test_progress_report() {
        let (server, client) = mock_client().await;

        Mock::given(method("GET"))
            .and(path("/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"current": 1, "total": 4})))
            .mount(&server)
            .await;

        let mut out = Vec::new();
        execute(&client, Commands::Progress, &mut out, Path::new("")).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1/4 (25%)\n");
    }

    #[tokio::test]
    async fn test_missing_input_file() {
        let (_server, client) = mock_client().await;
        let dir = TempDir::new().unwrap();

        let command = Commands::Compute {
            config: dir.path().join("absent.json"),
            data: dir.path().join("absent.json"),
        };
        let err = execute(&client, command, &mut Vec::new(), dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_unwrap_field() {
        let sheet = json!({"success": true, "data": [{"id": 1}]});
        assert_eq!(unwrap_field(sheet, "data"), json!([{"id": 1}]));

        let bare = json!([{"id": 1}]);
        assert_eq!(unwrap_field(bare.clone(), "data"), bare);

        // Non-array field is left alone
        let odd = json!({"data": "x"});
        assert_eq!(unwrap_field(odd.clone(), "data"), odd);
    }

    #[test]
    fn test_cli_parses_export() {
        let cli = Cli::parse_from([
            "nddf",
            "--server",
            "http://localhost:9000",
            "export",
            "-c",
            "config.json",
            "-r",
            "results.json",
        ]);
        assert_eq!(cli.server.as_deref(), Some("http://localhost:9000"));
        match cli.command {
            Commands::Export { output, .. } => assert!(output.is_none()),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
