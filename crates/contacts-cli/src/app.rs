//! Contacts application wiring
//!
//! Builds the terminal collaborators from the configuration and data
//! directory, hands them to the runtime builder and owns the views the
//! controller renders into.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use contacts_core::{ContactView, SettingsStore, TabKind};
use contacts_runtime::{Collaborators, ContactsController, ControllerBuilder};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::interchange::{JsonLinesImporter, JsonLinesWriter};
use crate::platform::{
    ConfiguredPermissions, DirectoryContentResolver, ExitProcess, NoDocumentPicker,
    TempDirAllocator, TerminalDialogs, TerminalNotifier, CONTENT_DIR_NAME,
};
use crate::prompt::Prompt;
use crate::settings::TomlSettingsStore;
use crate::store::JsonContactStore;
use crate::views::TerminalView;

/// Terminal contacts browser
pub struct ContactsApp {
    controller: ContactsController,
    views: Vec<Arc<TerminalView>>,
    store: Arc<JsonContactStore>,
    settings: Arc<TomlSettingsStore>,
    prompt: Arc<Prompt>,
    data_dir: PathBuf,
    started: bool,
}

impl ContactsApp {
    /// Wire the browser over `data_dir`. `launch_locator` is imported once the
    /// views are attached.
    pub fn new(config: &AppConfig, data_dir: PathBuf, launch_locator: Option<String>) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)?;
        info!("Using data directory {}", data_dir.display());

        let settings = Arc::new(TomlSettingsStore::open(&data_dir)?);
        let store = Arc::new(JsonContactStore::new(&data_dir));
        let prompt = Arc::new(Prompt::stdin());
        let temp_dir = config
            .import
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        let collaborators = Collaborators {
            settings: settings.clone(),
            data: store.clone(),
            permissions: Arc::new(ConfiguredPermissions::new(
                config.permissions.granted.iter().copied(),
            )),
            process: Arc::new(ExitProcess),
            notifier: Arc::new(TerminalNotifier),
            writer: Arc::new(JsonLinesWriter),
            confirmer: Arc::new(JsonLinesImporter::new(
                store.clone(),
                prompt.clone(),
                config.import.auto_confirm,
            )),
            resolver: Arc::new(DirectoryContentResolver::new(data_dir.join(CONTENT_DIR_NAME))),
            temp_files: Arc::new(TempDirAllocator::new(temp_dir)),
            picker: Arc::new(NoDocumentPicker),
            dialogs: Arc::new(TerminalDialogs::new(prompt.clone(), store.clone())),
        };

        let mut builder = ControllerBuilder::new(collaborators)
            .with_capabilities(config.capabilities())
            .with_refresh_config(config.refresh_config());
        if let Some(locator) = launch_locator {
            builder = builder.launch_locator(locator);
        }

        let snapshot = settings.snapshot();
        let views = snapshot
            .show_tabs
            .tabs()
            .iter()
            .map(|tab| TerminalView::new(*tab, &snapshot))
            .collect();

        Ok(Self {
            controller: builder.build(),
            views,
            store,
            settings,
            prompt,
            data_dir,
            started: false,
        })
    }

    /// Run the startup sequence: permissions, view attachment, first resume.
    /// Returns false when contacts may not be read.
    pub async fn start(&mut self) -> bool {
        if !self.controller.on_create().await {
            warn!("Reading contacts was not permitted");
            return false;
        }
        let handles: Vec<Arc<dyn ContactView>> = self
            .views
            .iter()
            .map(|view| view.clone() as Arc<dyn ContactView>)
            .collect();
        self.controller.attach_views(&handles).await;
        self.controller.on_resume().await;
        self.started = true;
        true
    }

    /// Pause and tear down; remembers the selected tab
    pub async fn stop(&mut self) {
        if self.started {
            self.controller.on_pause().await;
        }
        self.controller.on_destroy().await;
        self.started = false;
    }

    pub fn controller(&self) -> &ContactsController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ContactsController {
        &mut self.controller
    }

    pub fn view(&self, tab: TabKind) -> Option<&Arc<TerminalView>> {
        self.views.iter().find(|view| view.tab() == tab)
    }

    /// Rows of the currently selected tab
    pub async fn current_lines(&self) -> Vec<String> {
        match self.controller.current_tab().await {
            Some(tab) => self.view(tab).map(|view| view.lines()).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    pub fn store(&self) -> &Arc<JsonContactStore> {
        &self.store
    }

    pub fn settings(&self) -> &Arc<TomlSettingsStore> {
        &self.settings
    }

    pub fn prompt(&self) -> &Arc<Prompt> {
        &self.prompt
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
