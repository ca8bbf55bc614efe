//! Terminal views
//!
//! Plain-text renderings of the contacts, favorites and groups tabs. Each view
//! keeps the last list it received plus the display settings it was told
//! about, and renders on demand.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contacts_core::{ConfigSnapshot, Contact, ContactList, ContactView, FontSize, TabKind};
use tracing::trace;

#[derive(Debug, Default)]
struct ViewData {
    contacts: ContactList,
    show_thumbnails: bool,
    show_phone_numbers: bool,
    start_with_surname: bool,
    font_size: FontSize,
    query: String,
    redraw: bool,
    /// Number of refreshes that replaced the list
    renders: usize,
}

pub struct TerminalView {
    tab: TabKind,
    data: Mutex<ViewData>,
}

impl TerminalView {
    pub fn new(tab: TabKind, snapshot: &ConfigSnapshot) -> Arc<Self> {
        Arc::new(Self {
            tab,
            data: Mutex::new(ViewData {
                show_thumbnails: snapshot.show_thumbnails,
                show_phone_numbers: snapshot.show_phone_numbers,
                start_with_surname: snapshot.start_name_with_surname,
                font_size: snapshot.font_size,
                ..ViewData::default()
            }),
        })
    }

    fn data(&self) -> MutexGuard<'_, ViewData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn render_count(&self) -> usize {
        self.data().renders
    }

    /// Rendered rows, filtered by the active search query
    pub fn lines(&self) -> Vec<String> {
        let data = self.data();
        let query = data.query.to_lowercase();
        let rows = match self.tab {
            TabKind::Contacts => data.contacts.iter().map(|c| contact_row(&data, c)).collect(),
            TabKind::Favorites => data
                .contacts
                .iter()
                .filter(|c| c.starred)
                .map(|c| contact_row(&data, c))
                .collect(),
            TabKind::Groups => group_rows(&data.contacts),
        };
        rows.into_iter()
            .filter(|row: &String| query.is_empty() || row.to_lowercase().contains(&query))
            .map(|row| match data.font_size {
                FontSize::ExtraLarge => row.to_uppercase(),
                _ => row,
            })
            .collect()
    }
}

fn initials(contact: &Contact) -> String {
    [&contact.first_name, &contact.surname]
        .iter()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

fn contact_row(data: &ViewData, contact: &Contact) -> String {
    let mut row = String::new();
    if data.show_thumbnails {
        row.push_str(&format!("({}) ", initials(contact)));
    }
    row.push_str(&contact.display_name(data.start_with_surname));
    if data.show_phone_numbers && !contact.phone_numbers.is_empty() {
        row.push_str("  ");
        row.push_str(&contact.phone_numbers.join(", "));
    }
    row
}

fn group_rows(contacts: &[Contact]) -> Vec<String> {
    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for group in contacts.iter().flat_map(|c| c.groups.iter()) {
        *groups.entry(group.as_str()).or_default() += 1;
    }
    groups
        .into_iter()
        .map(|(name, count)| format!("{} ({})", name, count))
        .collect()
}

impl ContactView for TerminalView {
    fn tab(&self) -> TabKind {
        self.tab
    }

    fn refresh_contacts(&self, contacts: &ContactList, skip_change_detection: bool) {
        let mut data = self.data();
        if !skip_change_detection && !data.redraw && data.contacts == *contacts {
            trace!("{} view unchanged", self.tab);
            return;
        }
        data.contacts = contacts.clone();
        data.redraw = false;
        data.renders += 1;
    }

    fn on_search_query_changed(&self, query: &str) {
        self.data().query = query.to_string();
    }

    fn on_search_closed(&self) {
        self.data().query.clear();
    }

    fn show_thumbnails_changed(&self, show: bool) {
        self.data().show_thumbnails = show;
    }

    fn name_order_changed(&self, start_with_surname: bool) {
        self.data().start_with_surname = start_with_surname;
    }

    fn font_size_changed(&self, font_size: FontSize) {
        self.data().font_size = font_size;
    }

    fn force_list_redraw(&self) {
        self.data().redraw = true;
    }
}
