//! CLI command definitions
//!
//! All CLI structs and subcommand enums are defined here.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// nddf - client for the NDDF shadow price service
#[derive(Parser, Debug)]
#[command(name = "nddf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/nddf/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Service URL, e.g. http://localhost:8000
    #[arg(short, long)]
    pub server: Option<String>,

    /// API path prefix (default: /api)
    #[arg(long)]
    pub base_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Upload an Excel workbook
    Upload {
        /// Workbook path (.xlsx or .xls)
        file: PathBuf,
    },

    /// Fetch all rows of one sheet of an uploaded workbook
    Sheet {
        /// File ID returned by `upload`
        file_id: String,

        /// Sheet name
        sheet_name: String,
    },

    /// Run the NDDF computation
    Compute {
        /// JSON file with the model configuration
        #[arg(short, long)]
        config: PathBuf,

        /// JSON file with the rows (an array, or a `sheet` response)
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Export computed results to a spreadsheet
    Export {
        /// JSON file with the model configuration
        #[arg(short, long)]
        config: PathBuf,

        /// JSON file with the results (an array, or a `compute` response)
        #[arg(short, long)]
        results: PathBuf,

        /// Output path (default: file name suggested by the server)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the column roles and default configuration
    Columns,

    /// Show progress of the running computation
    Progress,
}
