//! Error types for the type generator

use thiserror::Error;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, TypegenError>;

/// Type generator errors
#[derive(Error, Debug)]
pub enum TypegenError {
    #[error("No schemas left to compile after filtering")]
    NoSchemas,

    #[error("Invalid schema descriptor {uid}: {reason}")]
    InvalidDescriptor { uid: String, reason: String },

    #[error("Failed to render document: {0}")]
    Render(#[from] std::fmt::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}
