//! Mock Platform Collaborators
//!
//! Permission gate, process control, notifier and settings store.

use crate::lock;
use async_trait::async_trait;
use contacts_core::{
    ConfigSnapshot, Notice, Notifier, Permission, PermissionGate, ProcessControl, SettingsError,
    SettingsStore,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ----------------------------------------------------------------------------
// Permissions
// ----------------------------------------------------------------------------

/// Grants everything except explicitly denied permissions
#[derive(Default)]
pub struct MockPermissionGate {
    denied: Mutex<HashSet<Permission>>,
    requests: Mutex<Vec<Permission>>,
}

impl MockPermissionGate {
    pub fn granting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn denying(permissions: &[Permission]) -> Arc<Self> {
        let gate = Self::default();
        lock(&gate.denied).extend(permissions.iter().copied());
        Arc::new(gate)
    }

    /// Every permission requested, in order
    pub fn requests(&self) -> Vec<Permission> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl PermissionGate for MockPermissionGate {
    async fn request(&self, permission: Permission) -> bool {
        lock(&self.requests).push(permission);
        !lock(&self.denied).contains(&permission)
    }
}

// ----------------------------------------------------------------------------
// Process / Notifier
// ----------------------------------------------------------------------------

/// Counts terminations instead of exiting
#[derive(Default)]
pub struct MockProcess {
    terminations: AtomicUsize,
}

impl MockProcess {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn termination_count(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

impl ProcessControl for MockProcess {
    fn terminate(&self) {
        self.terminations.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        lock(&self.notices).push(notice);
    }
}

// ----------------------------------------------------------------------------
// Settings
// ----------------------------------------------------------------------------

/// In-memory settings store that tests mutate between lifecycle calls
pub struct MockSettings {
    snapshot: Mutex<ConfigSnapshot>,
    last_export: Mutex<Option<PathBuf>>,
    last_used_writes: Mutex<Vec<usize>>,
}

impl MockSettings {
    pub fn new(snapshot: ConfigSnapshot) -> Arc<Self> {
        Arc::new(Self {
            snapshot: Mutex::new(snapshot),
            last_export: Mutex::new(None),
            last_used_writes: Mutex::new(Vec::new()),
        })
    }

    /// Change the live settings, as a settings screen would
    pub fn update(&self, change: impl FnOnce(&mut ConfigSnapshot)) {
        change(&mut *lock(&self.snapshot));
    }

    pub fn set_last_export(&self, path: Option<PathBuf>) {
        *lock(&self.last_export) = path;
    }

    /// Every value written through `set_last_used_tab`
    pub fn last_used_writes(&self) -> Vec<usize> {
        lock(&self.last_used_writes).clone()
    }
}

impl SettingsStore for MockSettings {
    fn snapshot(&self) -> ConfigSnapshot {
        lock(&self.snapshot).clone()
    }

    fn set_last_used_tab(&self, index: usize) -> Result<(), SettingsError> {
        lock(&self.last_used_writes).push(index);
        lock(&self.snapshot).last_used_tab_index = index;
        Ok(())
    }

    fn last_export_path(&self) -> Option<PathBuf> {
        lock(&self.last_export).clone()
    }

    fn set_last_export_path(&self, path: &Path) -> Result<(), SettingsError> {
        *lock(&self.last_export) = Some(path.to_path_buf());
        Ok(())
    }
}
