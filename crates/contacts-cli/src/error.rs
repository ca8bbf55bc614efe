//! Error handling for the contacts CLI

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Contacts error: {0}")]
    Contacts(#[from] contacts_core::ContactsError),

    #[error("{0}")]
    Pipeline(#[from] contacts_core::PipelineError),

    /// A pipeline failure the user has already been notified about
    #[error("{0}")]
    Reported(contacts_core::PipelineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("State persistence error: {0}")]
    StatePersistence(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlWriting(#[from] toml::ser::Error),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// Whether the failure was already shown and only needs an exit status
    pub fn is_reported(&self) -> bool {
        matches!(self, CliError::Reported(_))
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Config(err.to_string())
    }
}
