//! Terminal platform adapters
//!
//! Stand-ins for the host services the runtime talks to: a configured
//! permission set, a directory-backed content resolver, scratch files in a
//! temp directory, terminal dialogs and notices, and process termination.

use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use contacts_core::{
    ContentResolver, ContentStream, DocumentPicker, ExportChoice, ExportSink, Notice, Notifier,
    Permission, PermissionGate, PickerError, ProcessControl, TempFileAllocator, TransferDialogs,
    INTERCHANGE_EXTENSION,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::prompt::Prompt;
use crate::store::JsonContactStore;

/// Exit status used when settings changed and the browser must be relaunched
pub const RESTART_EXIT_CODE: i32 = 75;

/// Directory under the data directory that backs `content://` references
pub const CONTENT_DIR_NAME: &str = "content";

// ----------------------------------------------------------------------------
// Permissions
// ----------------------------------------------------------------------------

pub struct ConfiguredPermissions {
    granted: HashSet<Permission>,
}

impl ConfiguredPermissions {
    pub fn new(granted: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PermissionGate for ConfiguredPermissions {
    async fn request(&self, permission: Permission) -> bool {
        let granted = self.granted.contains(&permission);
        debug!("Permission {} {}", permission, if granted { "granted" } else { "denied" });
        granted
    }
}

// ----------------------------------------------------------------------------
// Content references
// ----------------------------------------------------------------------------

/// Serves `content://authority/path` from `<root>/authority/path`
pub struct DirectoryContentResolver {
    root: PathBuf,
}

impl DirectoryContentResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn backing_path(&self, reference: &Url) -> io::Result<PathBuf> {
        let authority = reference.host_str().unwrap_or_default();
        let relative = Path::new(authority).join(reference.path().trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("content reference escapes provider root: {}", reference),
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ContentResolver for DirectoryContentResolver {
    async fn open_input(&self, reference: &Url) -> io::Result<ContentStream> {
        let path = self.backing_path(reference)?;
        debug!("Resolving {} to {}", reference, path.display());
        let file = tokio::fs::File::open(&path).await?;
        Ok(Box::new(file))
    }
}

// ----------------------------------------------------------------------------
// Scratch files
// ----------------------------------------------------------------------------

pub struct TempDirAllocator {
    dir: PathBuf,
}

impl TempDirAllocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TempFileAllocator for TempDirAllocator {
    fn allocate(&self) -> Option<PathBuf> {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!("Cannot create {}: {}", self.dir.display(), e);
            return None;
        }
        let suffix = format!(".{}", INTERCHANGE_EXTENSION);
        let file = tempfile::Builder::new()
            .prefix("import-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .map_err(|e| warn!("Cannot allocate scratch file: {}", e))
            .ok()?;
        file.into_temp_path()
            .keep()
            .map_err(|e| warn!("Cannot keep scratch file: {}", e))
            .ok()
    }
}

// ----------------------------------------------------------------------------
// Picker
// ----------------------------------------------------------------------------

/// A terminal has no system document picker
pub struct NoDocumentPicker;

#[async_trait]
impl DocumentPicker for NoDocumentPicker {
    async fn pick_document(&self, _mime_type: &str) -> Result<Option<String>, PickerError> {
        Err(PickerError::NoHandler)
    }

    async fn create_document(
        &self,
        _suggested_name: &str,
        _mime_type: &str,
    ) -> Result<Option<Box<dyn ExportSink>>, PickerError> {
        Err(PickerError::NoHandler)
    }
}

// ----------------------------------------------------------------------------
// Dialogs
// ----------------------------------------------------------------------------

pub struct TerminalDialogs {
    prompt: Arc<Prompt>,
    store: Arc<JsonContactStore>,
}

impl TerminalDialogs {
    pub fn new(prompt: Arc<Prompt>, store: Arc<JsonContactStore>) -> Self {
        Self { prompt, store }
    }
}

/// Parse a comma-separated source list
pub fn parse_sources(input: &str) -> HashSet<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|source| !source.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl TransferDialogs for TerminalDialogs {
    async fn choose_import_file(&self) -> Option<PathBuf> {
        let answer = self.prompt.ask("Import file: ").await?;
        if answer.is_empty() {
            return None;
        }
        Some(PathBuf::from(answer))
    }

    async fn choose_export(
        &self,
        last_export_path: Option<PathBuf>,
        _picker_capable: bool,
    ) -> Option<ExportChoice> {
        let file_name = format!("contacts.{}", INTERCHANGE_EXTENSION);
        let default = last_export_path
            .map(|dir| dir.join(&file_name))
            .unwrap_or_else(|| PathBuf::from(&file_name));

        let answer = self
            .prompt
            .ask(&format!("Export to [{}]: ", default.display()))
            .await?;
        let destination = if answer.is_empty() {
            default
        } else {
            PathBuf::from(answer)
        };

        let sources = match self.store.sources().await {
            Ok(sources) => sources.join(", "),
            Err(e) => {
                warn!("Cannot list sources: {}", e);
                String::new()
            }
        };
        let excluded = self
            .prompt
            .ask(&format!("Exclude sources ({}): ", sources))
            .await?;

        Some(ExportChoice {
            destination,
            excluded_sources: parse_sources(&excluded),
        })
    }
}

// ----------------------------------------------------------------------------
// Process and notices
// ----------------------------------------------------------------------------

pub struct ExitProcess;

impl ProcessControl for ExitProcess {
    fn terminate(&self) {
        info!("Settings changed, exiting for relaunch");
        println!("Display settings changed; start the browser again to apply them.");
        std::process::exit(RESTART_EXIT_CODE);
    }
}

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        println!("{}", notice);
    }
}
