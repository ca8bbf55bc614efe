//! Recording Views
//!
//! [`ContactView`] implementation that records every callback it receives.

use crate::lock;
use contacts_core::{ContactList, ContactView, FontSize, TabKind, TabMask};
use std::sync::{Arc, Mutex};

/// One callback received by a [`RecordingView`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Refreshed {
        ids: Vec<u64>,
        skip_change_detection: bool,
    },
    SearchQuery(String),
    SearchOpened,
    SearchClosed,
    Thumbnails(bool),
    NameOrder(bool),
    FontSize(FontSize),
    ForceRedraw,
    FinishActionMode,
}

pub struct RecordingView {
    tab: TabKind,
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn new(tab: TabKind) -> Arc<Self> {
        Arc::new(Self {
            tab,
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        lock(&self.events).clone()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }

    /// Every list this view received, with its skip flag
    pub fn refreshes(&self) -> Vec<(Vec<u64>, bool)> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Refreshed {
                    ids,
                    skip_change_detection,
                } => Some((ids.clone(), *skip_change_detection)),
                _ => None,
            })
            .collect()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes().len()
    }

    /// Every search query this view received, in order
    pub fn queries(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                ViewEvent::SearchQuery(query) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn received(&self, event: &ViewEvent) -> bool {
        lock(&self.events).contains(event)
    }

    fn record(&self, event: ViewEvent) {
        lock(&self.events).push(event);
    }
}

impl ContactView for RecordingView {
    fn tab(&self) -> TabKind {
        self.tab
    }

    fn refresh_contacts(&self, contacts: &ContactList, skip_change_detection: bool) {
        self.record(ViewEvent::Refreshed {
            ids: contacts.iter().map(|contact| contact.id).collect(),
            skip_change_detection,
        });
    }

    fn on_search_query_changed(&self, query: &str) {
        self.record(ViewEvent::SearchQuery(query.to_string()));
    }

    fn on_search_opened(&self) {
        self.record(ViewEvent::SearchOpened);
    }

    fn on_search_closed(&self) {
        self.record(ViewEvent::SearchClosed);
    }

    fn show_thumbnails_changed(&self, show: bool) {
        self.record(ViewEvent::Thumbnails(show));
    }

    fn name_order_changed(&self, start_with_surname: bool) {
        self.record(ViewEvent::NameOrder(start_with_surname));
    }

    fn font_size_changed(&self, font_size: FontSize) {
        self.record(ViewEvent::FontSize(font_size));
    }

    fn force_list_redraw(&self) {
        self.record(ViewEvent::ForceRedraw);
    }

    fn finish_action_mode(&self) {
        self.record(ViewEvent::FinishActionMode);
    }
}

/// One recording view per tab in `mask`, in view-pager order
pub fn recording_views(mask: TabMask) -> Vec<Arc<RecordingView>> {
    mask.tabs().iter().map(|tab| RecordingView::new(*tab)).collect()
}

/// Upcast recording views for registration
pub fn as_contact_views(views: &[Arc<RecordingView>]) -> Vec<Arc<dyn ContactView>> {
    views
        .iter()
        .map(|view| Arc::clone(view) as Arc<dyn ContactView>)
        .collect()
}
