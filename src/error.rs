use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the abr-search application
#[derive(Error, Debug)]
pub enum AbrError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// XML parse errors
    #[error("XML error in {path}: {source}")]
    Xml {
        source: quick_xml::Error,
        path: PathBuf,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Search engine transport errors
    #[error("Search engine request failed: {0}")]
    EngineTransport(#[from] reqwest::Error),

    /// Search engine returned a non-success response
    #[error("Search engine returned {status}: {body}")]
    EngineResponse { status: u16, body: String },

    /// Embedding model errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Invalid search query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for abr-search operations
pub type Result<T> = std::result::Result<T, AbrError>;
