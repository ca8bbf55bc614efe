//! Import sources and export targets
//!
//! Classification of caller-supplied locators and the sink wrappers the export
//! pipeline acquires.

use crate::collaborators::ExportSink;
use crate::types::SourceId;
use std::collections::HashSet;
use std::path::PathBuf;
use url::Url;

/// MIME type of the interchange file format
pub const INTERCHANGE_MIME_TYPE: &str = "text/x-vcard";

/// Extension used for suggested export file names
pub const INTERCHANGE_EXTENSION: &str = "vcf";

// ----------------------------------------------------------------------------
// Import Source
// ----------------------------------------------------------------------------

/// Where an import reads from, classified by the locator's origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// A file the parser can read directly
    LocalPath(PathBuf),
    /// Data owned by another process; must be materialized first
    ContentReference(Url),
    /// Anything else, carrying the offending scheme
    Unsupported(String),
}

impl ImportSource {
    /// Classify a locator by its scheme. A locator without a scheme is a
    /// local path.
    pub fn classify(locator: &str) -> Self {
        let locator = locator.trim();
        if locator.is_empty() {
            return ImportSource::Unsupported(String::new());
        }

        match Url::parse(locator) {
            // Single-letter schemes are drive letters, not URLs
            Ok(url) if url.scheme().len() == 1 => ImportSource::LocalPath(PathBuf::from(locator)),
            Ok(url) => match url.scheme() {
                "file" => match url.to_file_path() {
                    Ok(path) => ImportSource::LocalPath(path),
                    Err(()) => ImportSource::Unsupported("file".to_string()),
                },
                "content" => ImportSource::ContentReference(url),
                scheme => ImportSource::Unsupported(scheme.to_string()),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                ImportSource::LocalPath(PathBuf::from(locator))
            }
            Err(_) => ImportSource::Unsupported(String::new()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ImportSource::LocalPath(_) => "local_path",
            ImportSource::ContentReference(_) => "content_reference",
            ImportSource::Unsupported(_) => "unsupported",
        }
    }
}

// ----------------------------------------------------------------------------
// Export Target
// ----------------------------------------------------------------------------

/// Destination hint handed to `export_to`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDestination {
    /// Concrete file used on platforms without a document picker; its file
    /// name doubles as the suggested name for the picker
    pub path: PathBuf,
}

impl ExportDestination {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File name suggested to the document picker
    pub fn suggested_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("contacts.{}", INTERCHANGE_EXTENSION))
    }
}

/// Parameters of one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub destination: ExportDestination,
    pub excluded_sources: HashSet<SourceId>,
}

/// An acquired writable sink, tagged by how it was obtained
pub enum ExportTarget {
    /// Opened directly on a concrete file
    DirectStream(Box<dyn ExportSink>),
    /// Obtained through the platform document picker
    PickedDocument(Box<dyn ExportSink>),
}

impl ExportTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            ExportTarget::DirectStream(_) => "direct_stream",
            ExportTarget::PickedDocument(_) => "picked_document",
        }
    }

    pub fn into_sink(self) -> Box<dyn ExportSink> {
        match self {
            ExportTarget::DirectStream(sink) | ExportTarget::PickedDocument(sink) => sink,
        }
    }
}

impl core::fmt::Debug for ExportTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sink = match self {
            ExportTarget::DirectStream(sink) | ExportTarget::PickedDocument(sink) => sink,
        };
        write!(f, "{}({})", self.kind(), sink.describe())
    }
}
