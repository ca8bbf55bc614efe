//! Controller Builder API
//!
//! Wires the host's collaborators into a [`ContactsController`] together with
//! its refresh coordinator and import/export pipelines.

use crate::controller::ContactsController;
use crate::export::{ExportCollaborators, ExportPipeline};
use crate::import::{ImportCollaborators, ImportPipeline};
use crate::refresh::{RefreshConfig, RefreshCoordinator};
use contacts_core::{
    Capabilities, ContentResolver, DataAccess, DocumentPicker, ImportConfirmer,
    InterchangeWriter, Notifier, PermissionGate, ProcessControl, SettingsStore,
    TempFileAllocator, TransferDialogs, ViewState,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

// ----------------------------------------------------------------------------
// Collaborators
// ----------------------------------------------------------------------------

/// Every host-provided collaborator the controller needs
#[derive(Clone)]
pub struct Collaborators {
    pub settings: Arc<dyn SettingsStore>,
    pub data: Arc<dyn DataAccess>,
    pub permissions: Arc<dyn PermissionGate>,
    pub process: Arc<dyn ProcessControl>,
    pub notifier: Arc<dyn Notifier>,
    pub writer: Arc<dyn InterchangeWriter>,
    pub confirmer: Arc<dyn ImportConfirmer>,
    pub resolver: Arc<dyn ContentResolver>,
    pub temp_files: Arc<dyn TempFileAllocator>,
    pub picker: Arc<dyn DocumentPicker>,
    pub dialogs: Arc<dyn TransferDialogs>,
}

// ----------------------------------------------------------------------------
// Controller Builder
// ----------------------------------------------------------------------------

/// Builder for the contacts controller
pub struct ControllerBuilder {
    collaborators: Collaborators,
    capabilities: Capabilities,
    refresh_config: RefreshConfig,
    launch_locator: Option<String>,
}

impl ControllerBuilder {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            capabilities: Capabilities::default(),
            refresh_config: RefreshConfig::default(),
            launch_locator: None,
        }
    }

    /// Set what the host platform can do
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_refresh_config(mut self, config: RefreshConfig) -> Self {
        self.refresh_config = config;
        self
    }

    /// Import this locator once the views are attached
    pub fn launch_locator(mut self, locator: impl Into<String>) -> Self {
        self.launch_locator = Some(locator.into());
        self
    }

    pub fn build(self) -> ContactsController {
        let c = self.collaborators;
        let shown = c.settings.snapshot().show_tabs;
        debug!(
            "Building controller for {:?} (document picker: {})",
            shown, self.capabilities.document_picker
        );

        let views = Arc::new(RwLock::new(ViewState::new(shown)));
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::clone(&c.data),
            Arc::clone(&views),
            self.refresh_config,
        ));

        let importer = ImportPipeline::new(
            self.capabilities,
            ImportCollaborators {
                resolver: c.resolver,
                temp_files: c.temp_files,
                confirmer: c.confirmer,
                permissions: Arc::clone(&c.permissions),
                picker: Arc::clone(&c.picker),
                dialogs: Arc::clone(&c.dialogs),
                notifier: Arc::clone(&c.notifier),
            },
            Arc::clone(&coordinator),
        );

        let exporter = ExportPipeline::new(
            self.capabilities,
            ExportCollaborators {
                data: c.data,
                writer: c.writer,
                permissions: Arc::clone(&c.permissions),
                picker: c.picker,
                dialogs: c.dialogs,
                settings: Arc::clone(&c.settings),
                notifier: c.notifier,
            },
        );

        ContactsController::new(
            c.settings,
            c.permissions,
            c.process,
            views,
            coordinator,
            importer,
            exporter,
            self.launch_locator,
        )
    }
}
