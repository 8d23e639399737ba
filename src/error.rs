//! Error types for polyscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolyscribeError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Splitter errors — fatal, abort the job before any dispatch
    #[error("Unreadable source artifact: {message}")]
    UnreadableSource { message: String },

    #[error("Source artifact is empty: {message}")]
    EmptySource { message: String },

    // External capability errors — recovered per unit by the dispatcher
    #[error("External call failed: {message}")]
    ExternalCall { message: String },

    // Collector errors — invariant violations, fatal to the job
    #[error("Incomplete result set: {message}")]
    IncompleteResults { message: String },

    // Persistence errors — fatal, the session is still cleaned up
    #[error("Failed to persist document: {message}")]
    Persist { message: String },

    #[error("Document not found: {name}")]
    DocumentNotFound { name: String },

    // Session errors
    #[error("Session setup failed: {message}")]
    Session { message: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, PolyscribeError>;
