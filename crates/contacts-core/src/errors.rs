//! Error types for the contacts browser
//!
//! Pipeline failures form a closed taxonomy that is converted to a single
//! user-visible notice at the pipeline boundary. Collaborator failures have
//! their own enums so the coordination layer can classify them.

use crate::collaborators::{ExportOutcome, Permission};
use std::io;

// ----------------------------------------------------------------------------
// Pipeline Errors
// ----------------------------------------------------------------------------

/// Failures of the import and export pipelines
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Unsupported import source: {scheme}")]
    UnsupportedFormat { scheme: String },
    #[error("Resource unavailable: {resource}")]
    ResourceUnavailable { resource: String },
    #[error("No platform handler for {feature}")]
    FeatureUnavailable { feature: String },
    #[error("Permission denied: {permission}")]
    PermissionDenied { permission: Permission },
    #[error("No entries to export")]
    NoEntries,
    #[error("Some entries failed to export")]
    PartialFailure,
    #[error("I/O failure: {reason}")]
    GenericIoFailure { reason: String },
}

impl PipelineError {
    pub fn generic(reason: impl Into<String>) -> Self {
        PipelineError::GenericIoFailure {
            reason: reason.into(),
        }
    }

    /// Whether this failure is reported to the user at all
    pub fn is_silent(&self) -> bool {
        matches!(self, PipelineError::PermissionDenied { .. })
    }
}

impl From<io::Error> for PipelineError {
    fn from(err: io::Error) -> Self {
        PipelineError::generic(err.to_string())
    }
}

impl From<DataAccessError> for PipelineError {
    fn from(err: DataAccessError) -> Self {
        PipelineError::generic(err.to_string())
    }
}

impl ExportOutcome {
    /// Treat anything short of a complete export as a failure
    pub fn into_result(self) -> core::result::Result<(), PipelineError> {
        match self {
            ExportOutcome::AllSucceeded => Ok(()),
            ExportOutcome::PartiallySucceeded => Err(PipelineError::PartialFailure),
            ExportOutcome::Failed => Err(PipelineError::generic("interchange writer failed")),
        }
    }
}

// ----------------------------------------------------------------------------
// Collaborator Errors
// ----------------------------------------------------------------------------

/// Failures reported by the contact data-access layer
#[derive(Debug, thiserror::Error)]
pub enum DataAccessError {
    #[error("Contact store unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("Contact store I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed contact data: {reason}")]
    Malformed { reason: String },
}

/// Failures of the durable settings store
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {reason}")]
    Read { reason: String },
    #[error("Failed to write settings: {reason}")]
    Write { reason: String },
}

/// Failures of the platform document picker
#[derive(Debug, thiserror::Error)]
pub enum PickerError {
    #[error("No application can handle the request")]
    NoHandler,
    #[error("Picker failed: {reason}")]
    Failed { reason: String },
}

// ----------------------------------------------------------------------------
// Unified Error
// ----------------------------------------------------------------------------

/// Top-level error for the contacts crates
#[derive(Debug, thiserror::Error)]
pub enum ContactsError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Data access error: {0}")]
    DataAccess(#[from] DataAccessError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

pub type Result<T> = core::result::Result<T, ContactsError>;
