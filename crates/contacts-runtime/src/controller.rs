//! Contacts Controller
//!
//! Owns the lifecycle of the browser: the startup permission chain, view
//! attachment, resume and pause handling, search and tab selection, and
//! delegation to the import and export pipelines.

use crate::export::{ExportPipeline, ExportStatus};
use crate::import::{ImportPipeline, ImportStatus};
use crate::refresh::{RefreshCoordinator, RefreshOutcome};
use contacts_core::{
    ConfigSnapshot, ContactView, ExportRequest, Permission, PermissionGate, PipelineError,
    ProcessControl, ResumeAction, ResumeContext, SettingsStore, StateChangeDetector, TabKind,
    TabMask, ViewState,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Coordinating controller of the contacts browser
pub struct ContactsController {
    settings: Arc<dyn SettingsStore>,
    permissions: Arc<dyn PermissionGate>,
    process: Arc<dyn ProcessControl>,
    views: Arc<RwLock<ViewState>>,
    coordinator: Arc<RefreshCoordinator>,
    importer: ImportPipeline,
    exporter: ExportPipeline,

    /// Settings as they were at the last pause
    stored: ConfigSnapshot,
    permissions_handled: bool,
    first_resume: bool,
    /// Locator handed over at launch, imported once views are attached
    pending_import: Option<String>,
}

impl ContactsController {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        settings: Arc<dyn SettingsStore>,
        permissions: Arc<dyn PermissionGate>,
        process: Arc<dyn ProcessControl>,
        views: Arc<RwLock<ViewState>>,
        coordinator: Arc<RefreshCoordinator>,
        importer: ImportPipeline,
        exporter: ExportPipeline,
        pending_import: Option<String>,
    ) -> Self {
        let stored = settings.snapshot();
        Self {
            settings,
            permissions,
            process,
            views,
            coordinator,
            importer,
            exporter,
            stored,
            permissions_handled: false,
            first_resume: true,
            pending_import,
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Capture the settings snapshot and run the permission chain. Returns
    /// whether contacts may be read.
    pub async fn on_create(&mut self) -> bool {
        self.stored = self.settings.snapshot();

        let granted = self.permissions.request(Permission::ReadContacts).await;
        if granted {
            if !self.permissions.request(Permission::WriteContacts).await {
                debug!("Write contacts permission denied");
            }
            if !self.permissions.request(Permission::GetAccounts).await {
                debug!("Get accounts permission denied");
            }
        } else {
            warn!("Read contacts permission denied");
        }

        self.permissions_handled = true;
        info!("Permissions handled (read contacts granted: {})", granted);
        granted
    }

    /// Register the host's views, select the default tab and run the
    /// initial load
    pub async fn attach_views(&mut self, views: &[Arc<dyn ContactView>]) -> RefreshOutcome {
        {
            let mut state = self.views.write().await;
            let ignored = state.registry.attach(views);
            if !ignored.is_empty() {
                warn!("Ignoring views for hidden tabs: {:?}", ignored);
            }
            let last = state.registry.mask().len().saturating_sub(1);
            state.current_index = self.stored.default_tab_index().min(last);
            debug!("Default tab: {:?}", state.current_tab());
        }

        let outcome = self.coordinator.refresh(TabMask::ALL).await;

        if let Some(locator) = self.pending_import.take() {
            info!("Importing launch locator {}", locator);
            if let Err(e) = self.importer.import_from(&locator).await {
                debug!("Launch import failed: {}", e);
            }
        }

        outcome
    }

    /// Compare the live settings with the stored snapshot and act on the
    /// difference. A restart terminates the process and runs nothing else.
    pub async fn on_resume(&mut self) -> ResumeAction {
        let live = self.settings.snapshot();
        let context = ResumeContext {
            permissions_handled: self.permissions_handled,
            first_resume: self.first_resume,
        };
        let action = StateChangeDetector::evaluate(&self.stored, &live, context);

        match &action {
            ResumeAction::Restart {
                reset_last_used_tab,
            } => {
                if *reset_last_used_tab {
                    if let Err(e) = self.settings.set_last_used_tab(0) {
                        warn!("Could not reset last used tab: {}", e);
                    }
                }
                warn!("Settings changed beyond what views can absorb, terminating");
                self.process.terminate();
                return action;
            }
            ResumeAction::PartialRefresh(plan) => {
                let attached = {
                    let state = self.views.read().await;
                    for change in &plan.changes {
                        let notified = change.apply_to(&state.registry);
                        debug!("Applied {:?} to {} views", change, notified);
                    }
                    state.registry.is_attached()
                };

                if let Some(mask) = plan.reload {
                    if attached {
                        self.coordinator.refresh(mask).await;
                    } else {
                        debug!("Views not attached yet, deferring reload of {:?}", mask);
                    }
                }
            }
            ResumeAction::NoOp => debug!("Resume with unchanged settings"),
        }

        self.first_resume = false;
        action
    }

    /// Store the settings snapshot and the current tab
    pub async fn on_pause(&mut self) {
        self.stored = self.settings.snapshot();
        let index = self.views.read().await.current_index;
        if let Err(e) = self.settings.set_last_used_tab(index) {
            warn!("Could not store last used tab: {}", e);
        }
    }

    pub async fn on_destroy(&mut self) {
        self.coordinator.close();
        self.views.write().await.registry.detach();
    }

    // ------------------------------------------------------------------------
    // Search and Tabs
    // ------------------------------------------------------------------------

    pub async fn open_search(&self) {
        let mut state = self.views.write().await;
        state.search.open();
        if let Some(view) = state.current_view() {
            view.on_search_opened();
        }
    }

    pub async fn close_search(&self) {
        let mut state = self.views.write().await;
        if let Some(view) = state.current_view() {
            view.on_search_closed();
        }
        state.search.close();
    }

    /// Forward a query to the current view; ignored while search is closed
    pub async fn search_query_changed(&self, query: &str) {
        let mut state = self.views.write().await;
        if !state.search.set_query(query) {
            return;
        }
        if let Some(view) = state.current_view() {
            view.on_search_query_changed(query);
        }
    }

    /// Switch to the tab at `index`. An open search is cleared on every view
    /// and closed; every view leaves multi-selection mode.
    pub async fn select_tab(&self, index: usize) -> bool {
        let mut state = self.views.write().await;
        if state.registry.mask().tab_at(index).is_none() {
            debug!("No tab at position {}", index);
            return false;
        }

        if state.search.is_open() {
            for view in state.registry.live_views() {
                view.on_search_query_changed("");
            }
            if let Some(view) = state.current_view() {
                view.on_search_closed();
            }
            state.search.close();
        }

        state.current_index = index;
        for view in state.registry.live_views() {
            view.finish_action_mode();
        }
        true
    }

    pub async fn current_tab(&self) -> Option<TabKind> {
        self.views.read().await.current_tab()
    }

    // ------------------------------------------------------------------------
    // Refresh Triggers
    // ------------------------------------------------------------------------

    pub async fn sorting_changed(&self) -> RefreshOutcome {
        self.coordinator
            .refresh(TabMask::CONTACTS | TabMask::FAVORITES)
            .await
    }

    /// The set of shown contact sources changed
    pub async fn source_filter_changed(&self) -> RefreshOutcome {
        if let Some(view) = self.views.read().await.registry.get(TabKind::Contacts) {
            view.force_list_redraw();
        }
        self.coordinator
            .refresh(TabMask::CONTACTS | TabMask::FAVORITES)
            .await
    }

    pub async fn refresh(&self, mask: TabMask) -> RefreshOutcome {
        self.coordinator.refresh(mask).await
    }

    // ------------------------------------------------------------------------
    // Import / Export
    // ------------------------------------------------------------------------

    pub async fn import_from(&self, locator: &str) -> Result<ImportStatus, PipelineError> {
        self.importer.import_from(locator).await
    }

    pub async fn import_interactive(&self) -> Result<ImportStatus, PipelineError> {
        self.importer.import_interactive().await
    }

    pub async fn export_to(&self, request: ExportRequest) -> Result<ExportStatus, PipelineError> {
        self.exporter.export_to(request).await
    }

    pub async fn export_interactive(&self) -> Result<ExportStatus, PipelineError> {
        self.exporter.export_interactive().await
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// Settings captured at creation or the last pause
    pub fn stored_snapshot(&self) -> &ConfigSnapshot {
        &self.stored
    }

    pub fn permissions_handled(&self) -> bool {
        self.permissions_handled
    }
}
