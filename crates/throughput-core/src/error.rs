// crates/throughput-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;
use throughput_parser::ParserError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Input parsing failed: {0}")]
    Parse(#[from] ParserError),

    #[error("Failed to read {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file is not valid TOML: {0}")]
    ConfigToml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Chart rendering failed for {}: {message}", path.display())]
    Render { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
