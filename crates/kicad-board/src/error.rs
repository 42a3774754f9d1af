use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("asset not found: {}", path.display())]
    AssetNotFound { path: PathBuf },

    #[error("invalid footprint options: missing {0}")]
    InvalidOptions(String),

    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
