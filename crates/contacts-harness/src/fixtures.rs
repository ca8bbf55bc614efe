//! Contact fixtures shared by tests and demos

use contacts_core::{Contact, ContactList};

/// Source id of the on-device address book in fixtures
pub const PHONE_SOURCE: &str = "phone";

/// Source id of a synced work account in fixtures
pub const WORK_SOURCE: &str = "work@example.com";

/// Four contacts across two sources; Ada and Grace are starred
pub fn sample_contacts() -> ContactList {
    vec![
        Contact::new(1, "Ada", "Lovelace")
            .with_source(PHONE_SOURCE)
            .starred(),
        Contact::new(2, "Alan", "Turing").with_source(PHONE_SOURCE),
        Contact::new(3, "Grace", "Hopper")
            .with_source(WORK_SOURCE)
            .starred(),
        Contact::new(4, "Edsger", "Dijkstra").with_source(WORK_SOURCE),
    ]
}

/// Ids of `contacts`, in order
pub fn ids(contacts: &[Contact]) -> Vec<u64> {
    contacts.iter().map(|contact| contact.id).collect()
}
