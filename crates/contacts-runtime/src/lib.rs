//! Contacts Browser Runtime
//!
//! The async engine of the contacts browser: a single-flight refresh
//! coordinator, the import and export pipelines, and the controller that
//! ties them to the host lifecycle. Hosts supply collaborators through
//! [`ControllerBuilder`].

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod builder;
pub mod controller;
pub mod export;
pub mod import;
pub mod refresh;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use builder::{Collaborators, ControllerBuilder};
pub use controller::ContactsController;
pub use export::{ExportCollaborators, ExportPipeline, ExportStatus, FileSink};
pub use import::{ImportCollaborators, ImportPipeline, ImportStatus};
pub use refresh::{
    RefreshConfig, RefreshCoordinator, RefreshEvent, RefreshOutcome, RefreshRequest,
    RefreshStats, SkipReason,
};
