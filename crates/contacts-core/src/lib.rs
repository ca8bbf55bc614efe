//! Contacts Browser Core
//!
//! Stable API for the contacts browser: the tab and contact data model, the
//! configuration snapshot, the view registry, the resume state-change detector,
//! and the contracts of every external collaborator. Nothing in this crate
//! spawns tasks; the engine lives in `contacts-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod collaborators;
pub mod config;
pub mod errors;
pub mod notice;
pub mod resume;
pub mod transfer;
pub mod types;
pub mod views;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use collaborators::{
    Capabilities, ContentResolver, ContentStream, DataAccess, DocumentPicker, ExportChoice,
    ExportOutcome, ExportSink, ImportConfirmer, InterchangeWriter, Notifier, Permission,
    PermissionGate, ProcessControl, SettingsStore, TempFileAllocator, TransferDialogs,
};
pub use config::ConfigSnapshot;
pub use errors::{
    ContactsError, DataAccessError, PickerError, PipelineError, Result, SettingsError,
};
pub use notice::Notice;
pub use resume::{ResumeAction, ResumeContext, ResumePlan, SettingChange, StateChangeDetector};
pub use transfer::{
    ExportDestination, ExportRequest, ExportTarget, ImportSource, INTERCHANGE_EXTENSION,
    INTERCHANGE_MIME_TYPE,
};
pub use types::{
    Contact, ContactList, DefaultTab, FontSize, SharedContacts, SourceId, TabKind, TabMask,
};
pub use views::{ContactView, SearchSession, ViewRegistry, ViewState};
