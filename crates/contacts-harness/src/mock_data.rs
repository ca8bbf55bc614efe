//! Mock Contact Store
//!
//! In-memory [`DataAccess`] with load counting, injectable failures and an
//! optional gate that holds every load until the test releases it.

use crate::lock;
use async_trait::async_trait;
use contacts_core::{ContactList, DataAccess, DataAccessError, SourceId};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};
use tracing::debug;

// ----------------------------------------------------------------------------
// Mock Data Access
// ----------------------------------------------------------------------------

pub struct MockDataAccess {
    contacts: Mutex<ContactList>,
    /// When set, each load consumes one permit before returning
    gate: Option<Arc<Semaphore>>,
    failure: Mutex<Option<String>>,
    loads: AtomicUsize,
    export_loads: AtomicUsize,
    load_started: Notify,
}

impl MockDataAccess {
    /// Store whose loads return immediately
    pub fn new(contacts: ContactList) -> Arc<Self> {
        Arc::new(Self::build(contacts, None))
    }

    /// Store whose loads block until [`release`](Self::release) is called
    pub fn gated(contacts: ContactList) -> Arc<Self> {
        Arc::new(Self::build(contacts, Some(Arc::new(Semaphore::new(0)))))
    }

    fn build(contacts: ContactList, gate: Option<Arc<Semaphore>>) -> Self {
        Self {
            contacts: Mutex::new(contacts),
            gate,
            failure: Mutex::new(None),
            loads: AtomicUsize::new(0),
            export_loads: AtomicUsize::new(0),
            load_started: Notify::new(),
        }
    }

    /// Let `count` blocked or future loads complete
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    pub fn set_contacts(&self, contacts: ContactList) {
        *lock(&self.contacts) = contacts;
    }

    /// Make every subsequent load fail with `reason`
    pub fn fail_loads(&self, reason: impl Into<String>) {
        *lock(&self.failure) = Some(reason.into());
    }

    pub fn clear_failure(&self) {
        *lock(&self.failure) = None;
    }

    /// Number of view loads started
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of export loads
    pub fn export_load_count(&self) -> usize {
        self.export_loads.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` view loads have started
    pub async fn wait_for_loads(&self, count: usize) {
        loop {
            let started = self.load_started.notified();
            if self.load_count() >= count {
                return;
            }
            started.await;
        }
    }

    fn check_failure(&self) -> Result<(), DataAccessError> {
        match lock(&self.failure).clone() {
            Some(reason) => Err(DataAccessError::Unavailable { reason }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataAccess for MockDataAccess {
    async fn load_contacts(&self) -> Result<ContactList, DataAccessError> {
        let load = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        self.load_started.notify_waiters();
        debug!("Mock load {} started", load);

        if let Some(gate) = &self.gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => {
                    return Err(DataAccessError::Unavailable {
                        reason: "gate closed".to_string(),
                    })
                }
            }
        }

        self.check_failure()?;
        Ok(lock(&self.contacts).clone())
    }

    async fn load_contacts_excluding(
        &self,
        excluded: &HashSet<SourceId>,
    ) -> Result<ContactList, DataAccessError> {
        self.export_loads.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(lock(&self.contacts)
            .iter()
            .filter(|contact| !excluded.contains(&contact.source))
            .cloned()
            .collect())
    }
}
