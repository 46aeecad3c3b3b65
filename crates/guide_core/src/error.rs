//! Catalog error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error("Verse catalog has no entry for the fallback topic '{0}'")]
    MissingFallback(&'static str),

    #[error("Invalid verse data: {0}")]
    InvalidData(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
