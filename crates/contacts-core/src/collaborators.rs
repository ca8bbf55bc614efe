//! Collaborator Contracts
//!
//! Narrow interfaces to everything the coordination layer does not own: the
//! contact store, the interchange reader/writer, permission prompts, the
//! platform picker, temp-file allocation and process control. Hosts provide
//! implementations; tests use the mocks in `contacts-harness`.

use crate::config::ConfigSnapshot;
use crate::errors::{DataAccessError, PickerError, SettingsError};
use crate::notice::Notice;
use crate::types::{Contact, ContactList, SourceId};
use async_trait::async_trait;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;
use url::Url;

// ----------------------------------------------------------------------------
// Data Access
// ----------------------------------------------------------------------------

/// Read access to the underlying contact store
#[async_trait]
pub trait DataAccess: Send + Sync {
    /// Load the full contact list shown by the browser views
    async fn load_contacts(&self) -> Result<ContactList, DataAccessError>;

    /// Load contacts for export, leaving out every contact from `excluded`
    async fn load_contacts_excluding(
        &self,
        excluded: &HashSet<SourceId>,
    ) -> Result<ContactList, DataAccessError>;
}

// ----------------------------------------------------------------------------
// Interchange Writer / Reader
// ----------------------------------------------------------------------------

/// Result of serializing a contact set into a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportOutcome {
    AllSucceeded,
    PartiallySucceeded,
    Failed,
}

/// A writable destination for exported contacts
///
/// `close` consumes the sink, so a sink can be closed at most once.
#[async_trait]
pub trait ExportSink: Send {
    async fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    async fn close(self: Box<Self>) -> io::Result<()>;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;
}

/// Serializes contacts in the interchange format
#[async_trait]
pub trait InterchangeWriter: Send + Sync {
    async fn write(&self, sink: &mut dyn ExportSink, contacts: &[Contact]) -> ExportOutcome;
}

/// Confirmation step and parser for a resolved import file
#[async_trait]
pub trait ImportConfirmer: Send + Sync {
    /// Present `path` to the user and apply it on confirmation.
    /// Returns true only when contacts were imported.
    async fn prompt_and_apply(&self, path: &Path) -> bool;
}

// ----------------------------------------------------------------------------
// Permissions
// ----------------------------------------------------------------------------

/// Runtime permissions the browser asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ReadContacts,
    WriteContacts,
    GetAccounts,
    ReadStorage,
    WriteStorage,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::ReadContacts => write!(f, "read_contacts"),
            Permission::WriteContacts => write!(f, "write_contacts"),
            Permission::GetAccounts => write!(f, "get_accounts"),
            Permission::ReadStorage => write!(f, "read_storage"),
            Permission::WriteStorage => write!(f, "write_storage"),
        }
    }
}

/// Grants or denies permissions, possibly after asking the user
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn request(&self, permission: Permission) -> bool;
}

// ----------------------------------------------------------------------------
// Platform
// ----------------------------------------------------------------------------

/// What the host platform can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// The platform offers a system document picker for import and export
    pub document_picker: bool,
}

/// Stream over data owned by another process
pub type ContentStream = Box<dyn AsyncRead + Send + Unpin>;

/// Opens content references handed over by other processes
#[async_trait]
pub trait ContentResolver: Send + Sync {
    async fn open_input(&self, reference: &Url) -> io::Result<ContentStream>;
}

/// Allocates scratch files for materialized imports
pub trait TempFileAllocator: Send + Sync {
    fn allocate(&self) -> Option<PathBuf>;
}

/// System document picker
///
/// Both methods return `Ok(None)` when the user backs out.
#[async_trait]
pub trait DocumentPicker: Send + Sync {
    /// Let the user pick an existing document; returns its locator
    async fn pick_document(&self, mime_type: &str) -> Result<Option<String>, PickerError>;

    /// Let the user create a document and return a sink writing into it
    async fn create_document(
        &self,
        suggested_name: &str,
        mime_type: &str,
    ) -> Result<Option<Box<dyn ExportSink>>, PickerError>;
}

/// What the user chose in the export dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportChoice {
    pub destination: PathBuf,
    pub excluded_sources: HashSet<SourceId>,
}

/// In-app dialogs used on platforms without a document picker
#[async_trait]
pub trait TransferDialogs: Send + Sync {
    /// File chooser for an importable file on local storage
    async fn choose_import_file(&self) -> Option<PathBuf>;

    /// Export dialog seeded with the last export location
    async fn choose_export(
        &self,
        last_export_path: Option<PathBuf>,
        picker_capable: bool,
    ) -> Option<ExportChoice>;
}

/// Terminates the hosting process
pub trait ProcessControl: Send + Sync {
    /// Unconditional; no graceful drain of in-flight work
    fn terminate(&self);
}

/// Shows user-visible notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

// ----------------------------------------------------------------------------
// Settings
// ----------------------------------------------------------------------------

/// Durable, externally owned settings store
pub trait SettingsStore: Send + Sync {
    /// Current value of every setting the views depend on
    fn snapshot(&self) -> ConfigSnapshot;

    fn set_last_used_tab(&self, index: usize) -> Result<(), SettingsError>;

    fn last_export_path(&self) -> Option<PathBuf>;

    fn set_last_export_path(&self, path: &Path) -> Result<(), SettingsError>;
}
