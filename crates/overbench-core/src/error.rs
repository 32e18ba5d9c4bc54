use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverbenchError {
    #[error("Missing artifact for distro '{distro}': {path}")]
    MissingArtifact { distro: String, path: PathBuf },

    #[error("Malformed artifact {path}: {reason}")]
    MalformedArtifact { path: PathBuf, reason: String },

    #[error("Container error: {0}")]
    Container(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OverbenchError>;
