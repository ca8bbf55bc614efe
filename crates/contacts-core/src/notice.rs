//! User-visible notices
//!
//! Every pipeline run ends in at most one notice. Pipeline errors and export
//! outcomes both map onto this closed set.

use crate::collaborators::ExportOutcome;
use crate::errors::PipelineError;
use core::fmt;

/// A message shown to the user once a pipeline finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ExportSucceeded,
    ExportPartiallyFailed,
    ExportFailed,
    NoEntriesForExport,
    InvalidFileFormat,
    SystemServiceDisabled,
    UnknownError,
    Error(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ExportSucceeded => write!(f, "Exporting successful"),
            Notice::ExportPartiallyFailed => write!(f, "Exporting of some entries failed"),
            Notice::ExportFailed => write!(f, "Exporting failed"),
            Notice::NoEntriesForExport => write!(f, "No entries for exporting have been found"),
            Notice::InvalidFileFormat => write!(f, "Invalid file format"),
            Notice::SystemServiceDisabled => {
                write!(f, "The app handling this request is disabled or missing")
            }
            Notice::UnknownError => write!(f, "An unknown error occurred"),
            Notice::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

impl From<ExportOutcome> for Notice {
    fn from(outcome: ExportOutcome) -> Self {
        match outcome {
            ExportOutcome::AllSucceeded => Notice::ExportSucceeded,
            ExportOutcome::PartiallySucceeded => Notice::ExportPartiallyFailed,
            ExportOutcome::Failed => Notice::ExportFailed,
        }
    }
}

impl PipelineError {
    /// Notice shown for this failure; `None` for silent aborts
    pub fn notice(&self) -> Option<Notice> {
        match self {
            PipelineError::UnsupportedFormat { .. } => Some(Notice::InvalidFileFormat),
            PipelineError::ResourceUnavailable { .. } => Some(Notice::UnknownError),
            PipelineError::FeatureUnavailable { .. } => Some(Notice::SystemServiceDisabled),
            PipelineError::PermissionDenied { .. } => None,
            PipelineError::NoEntries => Some(Notice::NoEntriesForExport),
            PipelineError::PartialFailure => Some(Notice::ExportPartiallyFailed),
            PipelineError::GenericIoFailure { reason } => Some(Notice::Error(reason.clone())),
        }
    }
}
