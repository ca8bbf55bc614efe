//! JSON-file contact store
//!
//! `contacts.json` in the data directory holds the whole address book as a
//! JSON array. Reads go through tokio's filesystem API; appends rewrite the
//! file under a lock so concurrent imports do not interleave.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use contacts_core::{Contact, ContactList, DataAccess, DataAccessError, SourceId};
use tokio::sync::Mutex;
use tracing::debug;

pub const CONTACTS_FILE_NAME: &str = "contacts.json";

pub struct JsonContactStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonContactStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CONTACTS_FILE_NAME),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<ContactList, DataAccessError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| DataAccessError::Malformed {
            reason: format!("{}: {}", self.path.display(), e),
        })
    }

    /// Append `contacts`, renumbering ids that collide with stored ones.
    /// Returns how many were added.
    pub async fn append(&self, contacts: ContactList) -> Result<usize, DataAccessError> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.read_all().await?;
        let mut taken: HashSet<u64> = stored.iter().map(|c| c.id).collect();
        // None once the id space above the highest stored id is used up
        let mut next_id = taken.iter().max().map_or(Some(1), |max| max.checked_add(1));

        let added = contacts.len();
        for mut contact in contacts {
            if taken.contains(&contact.id) {
                contact.id = loop {
                    let id = next_id.ok_or_else(|| DataAccessError::Malformed {
                        reason: format!("no free id left for contact {}", contact.id),
                    })?;
                    next_id = id.checked_add(1);
                    if !taken.contains(&id) {
                        break id;
                    }
                };
            }
            taken.insert(contact.id);
            stored.push(contact);
        }

        let json = serde_json::to_vec_pretty(&stored).map_err(|e| DataAccessError::Malformed {
            reason: e.to_string(),
        })?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;
        debug!("Stored {} contacts ({} new)", stored.len(), added);
        Ok(added)
    }

    /// Every source id present in the store
    pub async fn sources(&self) -> Result<Vec<SourceId>, DataAccessError> {
        let mut sources: Vec<SourceId> = self
            .read_all()
            .await?
            .into_iter()
            .map(|contact: Contact| contact.source)
            .collect();
        sources.sort();
        sources.dedup();
        Ok(sources)
    }
}

#[async_trait]
impl DataAccess for JsonContactStore {
    async fn load_contacts(&self) -> Result<ContactList, DataAccessError> {
        let mut contacts = self.read_all().await?;
        contacts.sort_by_key(|c| (c.first_name.to_lowercase(), c.surname.to_lowercase()));
        Ok(contacts)
    }

    async fn load_contacts_excluding(
        &self,
        excluded: &HashSet<SourceId>,
    ) -> Result<ContactList, DataAccessError> {
        Ok(self
            .load_contacts()
            .await?
            .into_iter()
            .filter(|contact| !excluded.contains(&contact.source))
            .collect())
    }
}
