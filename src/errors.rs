use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in {file}: {source}")]
    Json {
        file: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

#[derive(Debug, Error)]
pub enum ErdError {
    #[error("Document source error: {0}")]
    Source(#[from] SourceError),
}
