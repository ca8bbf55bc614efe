//! View Registry
//!
//! Holds weak handles to the rendering surfaces of the active tabs, addressed
//! by tab slot. The registry never owns view lifecycle: a handle whose view was
//! dropped is skipped when it is looked up.

use crate::types::{ContactList, FontSize, TabKind, TabMask};
use std::sync::{Arc, Weak};

// ----------------------------------------------------------------------------
// View Handle
// ----------------------------------------------------------------------------

/// A tab's rendering surface
///
/// Only `tab` and `refresh_contacts` are required; the remaining capabilities
/// default to no-ops so a view implements just what it renders.
pub trait ContactView: Send + Sync {
    /// Tab this view renders
    fn tab(&self) -> TabKind;

    /// Receive a freshly loaded list. `skip_change_detection` asks the view to
    /// treat the list as structurally new instead of diffing it.
    fn refresh_contacts(&self, contacts: &ContactList, skip_change_detection: bool);

    fn on_search_query_changed(&self, _query: &str) {}

    fn on_search_opened(&self) {}

    fn on_search_closed(&self) {}

    fn show_thumbnails_changed(&self, _show: bool) {}

    fn name_order_changed(&self, _start_with_surname: bool) {}

    fn font_size_changed(&self, _font_size: FontSize) {}

    /// Drop any cached rendering on the next refresh
    fn force_list_redraw(&self) {}

    /// Leave multi-selection mode if active
    fn finish_action_mode(&self) {}
}

// ----------------------------------------------------------------------------
// Registry
// ----------------------------------------------------------------------------

/// Arena of weak view handles, one slot per [`TabKind`]
#[derive(Default)]
pub struct ViewRegistry {
    /// Tabs shown, in view-pager order
    mask: TabMask,
    slots: [Option<Weak<dyn ContactView>>; 3],
    attached: bool,
}

impl ViewRegistry {
    pub fn new(mask: TabMask) -> Self {
        Self {
            mask,
            slots: [None, None, None],
            attached: false,
        }
    }

    pub fn mask(&self) -> TabMask {
        self.mask
    }

    /// Whether the host has attached its views yet
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Register views for the shown tabs. Views for tabs outside the mask are
    /// ignored and reported back.
    pub fn attach(&mut self, views: &[Arc<dyn ContactView>]) -> Vec<TabKind> {
        let mut ignored = Vec::new();
        for view in views {
            let tab = view.tab();
            if self.mask.contains(tab) {
                self.slots[tab.slot()] = Some(Arc::downgrade(view));
            } else {
                ignored.push(tab);
            }
        }
        self.attached = true;
        ignored
    }

    /// Forget every registered view
    pub fn detach(&mut self) {
        self.slots = [None, None, None];
        self.attached = false;
    }

    /// Live view for `tab`, if registered and still alive
    pub fn get(&self, tab: TabKind) -> Option<Arc<dyn ContactView>> {
        if !self.mask.contains(tab) {
            return None;
        }
        self.slots[tab.slot()].as_ref().and_then(Weak::upgrade)
    }

    /// Live view at view-pager position `index`
    pub fn view_at(&self, index: usize) -> Option<Arc<dyn ContactView>> {
        self.mask.tab_at(index).and_then(|tab| self.get(tab))
    }

    /// Every live view, in view-pager order
    pub fn live_views(&self) -> Vec<Arc<dyn ContactView>> {
        self.mask
            .tabs()
            .iter()
            .filter_map(|tab| self.get(*tab))
            .collect()
    }

    /// Live views selected by `mask`, in view-pager order
    pub fn views_in(&self, mask: TabMask) -> Vec<(TabKind, Arc<dyn ContactView>)> {
        mask.tabs()
            .iter()
            .filter_map(|tab| self.get(*tab).map(|view| (*tab, view)))
            .collect()
    }
}

// ----------------------------------------------------------------------------
// Search Session
// ----------------------------------------------------------------------------

/// Search state shared by the controller and the refresh coordinator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSession {
    open: bool,
    query: String,
}

impl SearchSession {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the session and forget the query
    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
    }

    /// Record a query change; ignored while the session is closed
    pub fn set_query(&mut self, query: &str) -> bool {
        if !self.open {
            return false;
        }
        self.query = query.to_string();
        true
    }

    /// Query to reapply after a reload, if a search is active
    pub fn active_query(&self) -> Option<&str> {
        self.open.then_some(self.query.as_str())
    }
}

/// View state owned by the controller: registry, search and pager position
#[derive(Default)]
pub struct ViewState {
    pub registry: ViewRegistry,
    pub search: SearchSession,
    /// View-pager position of the current tab
    pub current_index: usize,
}

impl ViewState {
    pub fn new(mask: TabMask) -> Self {
        Self {
            registry: ViewRegistry::new(mask),
            search: SearchSession::default(),
            current_index: 0,
        }
    }

    pub fn current_view(&self) -> Option<Arc<dyn ContactView>> {
        self.registry.view_at(self.current_index)
    }

    pub fn current_tab(&self) -> Option<TabKind> {
        self.registry.mask().tab_at(self.current_index)
    }
}
