//! Shared wiring for the runtime integration tests

#![allow(dead_code)]

use contacts_core::{
    Capabilities, ConfigSnapshot, ContactView, ExportOutcome, SettingsStore, TabMask, ViewState,
};
use contacts_harness::{
    as_contact_views, recording_views, sample_contacts, MockConfirmer, MockDataAccess,
    MockDialogs, MockPermissionGate, MockPicker, MockProcess, MockResolver, MockSettings,
    MockTempFiles, MockWriter, PickerMode, RecordingNotifier, RecordingView,
};
use contacts_runtime::{Collaborators, ContactsController, ControllerBuilder};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Every mock collaborator, kept concrete so tests can inspect them
pub struct TestEnv {
    pub settings: Arc<MockSettings>,
    pub data: Arc<MockDataAccess>,
    pub permissions: Arc<MockPermissionGate>,
    pub process: Arc<MockProcess>,
    pub notifier: Arc<RecordingNotifier>,
    pub writer: Arc<MockWriter>,
    pub confirmer: Arc<MockConfirmer>,
    pub resolver: Arc<MockResolver>,
    pub temp_files: Arc<MockTempFiles>,
    pub picker: Arc<MockPicker>,
    pub dialogs: Arc<MockDialogs>,
    pub capabilities: Capabilities,
}

impl TestEnv {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self {
            settings: MockSettings::new(snapshot),
            data: MockDataAccess::new(sample_contacts()),
            permissions: MockPermissionGate::granting(),
            process: MockProcess::new(),
            notifier: RecordingNotifier::new(),
            writer: MockWriter::new(ExportOutcome::AllSucceeded),
            confirmer: MockConfirmer::accepting(),
            resolver: MockResolver::new(),
            temp_files: MockTempFiles::new().unwrap(),
            picker: MockPicker::new(PickerMode::Provide, None),
            dialogs: MockDialogs::new(None, None),
            capabilities: Capabilities::default(),
        }
    }

    /// Environment for a platform with a document picker
    pub fn with_picker(mut self, picker: Arc<MockPicker>) -> Self {
        self.picker = picker;
        self.capabilities = Capabilities {
            document_picker: true,
        };
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            settings: self.settings.clone(),
            data: self.data.clone(),
            permissions: self.permissions.clone(),
            process: self.process.clone(),
            notifier: self.notifier.clone(),
            writer: self.writer.clone(),
            confirmer: self.confirmer.clone(),
            resolver: self.resolver.clone(),
            temp_files: self.temp_files.clone(),
            picker: self.picker.clone(),
            dialogs: self.dialogs.clone(),
        }
    }

    pub fn builder(&self) -> ControllerBuilder {
        ControllerBuilder::new(self.collaborators()).with_capabilities(self.capabilities)
    }

    pub fn controller(&self) -> ContactsController {
        self.builder().build()
    }
}

/// Controller that has run `on_create` and attached one recording view per
/// shown tab
pub async fn started(env: &TestEnv) -> (ContactsController, Vec<Arc<RecordingView>>) {
    let mut controller = env.controller();
    controller.on_create().await;
    let views = recording_views(env.settings.snapshot().show_tabs);
    controller.attach_views(&as_contact_views(&views)).await;
    (controller, views)
}

/// View state with one recording view per tab in `mask` attached
pub fn attached_state(mask: TabMask) -> (Arc<RwLock<ViewState>>, Vec<Arc<RecordingView>>) {
    let views = recording_views(mask);
    let mut state = ViewState::new(mask);
    let handles: Vec<Arc<dyn ContactView>> = as_contact_views(&views);
    state.registry.attach(&handles);
    (Arc::new(RwLock::new(state)), views)
}
