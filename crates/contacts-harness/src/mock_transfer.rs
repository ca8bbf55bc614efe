//! Mock Import/Export Collaborators
//!
//! Sinks, writer, confirmer, resolver, temp-file allocator, document picker
//! and dialogs used to drive the transfer pipelines in tests.

use crate::lock;
use async_trait::async_trait;
use contacts_core::{
    Contact, ContentResolver, ContentStream, DocumentPicker, ExportChoice, ExportOutcome,
    ExportSink, ImportConfirmer, InterchangeWriter, PickerError, TempFileAllocator,
    TransferDialogs,
};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tempfile::TempDir;
use tokio::io::{AsyncRead, ReadBuf};
use url::Url;

// ----------------------------------------------------------------------------
// Export Sink
// ----------------------------------------------------------------------------

/// Shared record of what happened to a [`RecordingSink`]
#[derive(Debug, Default)]
pub struct SinkLog {
    bytes: Mutex<Vec<u8>>,
    writes: AtomicUsize,
    closes: AtomicUsize,
}

impl SinkLog {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.bytes)).into_owned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub struct RecordingSink {
    name: String,
    log: Arc<SinkLog>,
    fail_writes: bool,
}

impl RecordingSink {
    pub fn new(name: impl Into<String>) -> (Self, Arc<SinkLog>) {
        let log = Arc::new(SinkLog::default());
        (Self::with_log(name, Arc::clone(&log)), log)
    }

    pub fn with_log(name: impl Into<String>, log: Arc<SinkLog>) -> Self {
        Self {
            name: name.into(),
            log,
            fail_writes: false,
        }
    }

    /// Sink whose writes fail with a broken pipe
    pub fn failing(name: impl Into<String>) -> (Self, Arc<SinkLog>) {
        let (mut sink, log) = Self::new(name);
        sink.fail_writes = true;
        (sink, log)
    }
}

#[async_trait]
impl ExportSink for RecordingSink {
    async fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.log.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink rejected write"));
        }
        lock(&self.log.bytes).extend_from_slice(bytes);
        Ok(())
    }

    async fn close(self: Box<Self>) -> io::Result<()> {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

// ----------------------------------------------------------------------------
// Interchange Writer / Confirmer
// ----------------------------------------------------------------------------

/// Writes one line per contact and reports a configured outcome
pub struct MockWriter {
    outcome: ExportOutcome,
    calls: AtomicUsize,
    written: Mutex<Vec<u64>>,
}

impl MockWriter {
    pub fn new(outcome: ExportOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            written: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Ids of every contact handed to the writer
    pub fn written_ids(&self) -> Vec<u64> {
        lock(&self.written).clone()
    }
}

#[async_trait]
impl InterchangeWriter for MockWriter {
    async fn write(&self, sink: &mut dyn ExportSink, contacts: &[Contact]) -> ExportOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for contact in contacts {
            lock(&self.written).push(contact.id);
            let line = format!("{}\n", contact.display_name(false));
            if sink.write(line.as_bytes()).await.is_err() {
                return ExportOutcome::Failed;
            }
        }
        self.outcome
    }
}

/// Records every prompt and the file contents it was shown
pub struct MockConfirmer {
    accept: bool,
    prompts: Mutex<Vec<(PathBuf, Vec<u8>)>>,
}

impl MockConfirmer {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            accept: true,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn declining() -> Arc<Self> {
        Arc::new(Self {
            accept: false,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompted_paths(&self) -> Vec<PathBuf> {
        lock(&self.prompts)
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// File contents seen at each prompt; empty when the file was unreadable
    pub fn prompted_contents(&self) -> Vec<Vec<u8>> {
        lock(&self.prompts)
            .iter()
            .map(|(_, bytes)| bytes.clone())
            .collect()
    }
}

#[async_trait]
impl ImportConfirmer for MockConfirmer {
    async fn prompt_and_apply(&self, path: &Path) -> bool {
        let contents = tokio::fs::read(path).await.unwrap_or_default();
        lock(&self.prompts).push((path.to_path_buf(), contents));
        self.accept
    }
}

// ----------------------------------------------------------------------------
// Content Resolver / Temp Files
// ----------------------------------------------------------------------------

/// Stream that fails on its first read
struct BrokenStream;

impl AsyncRead for BrokenStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "content provider went away",
        )))
    }
}

/// Serves registered payloads by reference
#[derive(Default)]
pub struct MockResolver {
    payloads: Mutex<HashMap<String, Vec<u8>>>,
    broken: Mutex<Vec<String>>,
    opened: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, reference: &str, payload: impl Into<Vec<u8>>) {
        lock(&self.payloads).insert(reference.to_string(), payload.into());
    }

    /// Reference whose stream opens but fails on read
    pub fn insert_broken(&self, reference: &str) {
        lock(&self.broken).push(reference.to_string());
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentResolver for MockResolver {
    async fn open_input(&self, reference: &Url) -> io::Result<ContentStream> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if lock(&self.broken).iter().any(|r| r == reference.as_str()) {
            return Ok(Box::new(BrokenStream));
        }
        match lock(&self.payloads).get(reference.as_str()) {
            Some(payload) => Ok(Box::new(io::Cursor::new(payload.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no content at {}", reference),
            )),
        }
    }
}

/// Hands out files in a private temporary directory
pub struct MockTempFiles {
    dir: Option<TempDir>,
    allocated: AtomicUsize,
}

impl MockTempFiles {
    pub fn new() -> io::Result<Arc<Self>> {
        Ok(Arc::new(Self {
            dir: Some(tempfile::tempdir()?),
            allocated: AtomicUsize::new(0),
        }))
    }

    /// Allocator that never has a slot available
    pub fn exhausted() -> Arc<Self> {
        Arc::new(Self {
            dir: None,
            allocated: AtomicUsize::new(0),
        })
    }

    pub fn allocation_count(&self) -> usize {
        self.allocated.load(Ordering::SeqCst)
    }
}

impl TempFileAllocator for MockTempFiles {
    fn allocate(&self) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        let n = self.allocated.fetch_add(1, Ordering::SeqCst);
        Some(dir.path().join(format!("import-{}.vcf", n)))
    }
}

// ----------------------------------------------------------------------------
// Picker / Dialogs
// ----------------------------------------------------------------------------

/// How a [`MockPicker`] answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    Provide,
    Cancel,
    NoHandler,
}

pub struct MockPicker {
    mode: PickerMode,
    picked: Option<String>,
    sink_log: Arc<SinkLog>,
    created: Mutex<Vec<String>>,
    picks: AtomicUsize,
}

impl MockPicker {
    /// Picker that answers `pick_document` with `picked` in `Provide` mode
    pub fn new(mode: PickerMode, picked: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            mode,
            picked: picked.map(str::to_string),
            sink_log: Arc::new(SinkLog::default()),
            created: Mutex::new(Vec::new()),
            picks: AtomicUsize::new(0),
        })
    }

    /// Log shared by every sink this picker created
    pub fn sink_log(&self) -> Arc<SinkLog> {
        Arc::clone(&self.sink_log)
    }

    /// Suggested names of every document created
    pub fn created_names(&self) -> Vec<String> {
        lock(&self.created).clone()
    }

    pub fn pick_count(&self) -> usize {
        self.picks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentPicker for MockPicker {
    async fn pick_document(&self, _mime_type: &str) -> Result<Option<String>, PickerError> {
        self.picks.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            PickerMode::Provide => Ok(self.picked.clone()),
            PickerMode::Cancel => Ok(None),
            PickerMode::NoHandler => Err(PickerError::NoHandler),
        }
    }

    async fn create_document(
        &self,
        suggested_name: &str,
        _mime_type: &str,
    ) -> Result<Option<Box<dyn ExportSink>>, PickerError> {
        match self.mode {
            PickerMode::Provide => {
                lock(&self.created).push(suggested_name.to_string());
                Ok(Some(Box::new(RecordingSink::with_log(
                    suggested_name,
                    Arc::clone(&self.sink_log),
                ))))
            }
            PickerMode::Cancel => Ok(None),
            PickerMode::NoHandler => Err(PickerError::NoHandler),
        }
    }
}

/// Dialogs with canned answers
#[derive(Default)]
pub struct MockDialogs {
    import_file: Option<PathBuf>,
    export_choice: Option<ExportChoice>,
    import_prompts: AtomicUsize,
    export_seeds: Mutex<Vec<(Option<PathBuf>, bool)>>,
}

impl MockDialogs {
    pub fn new(import_file: Option<PathBuf>, export_choice: Option<ExportChoice>) -> Arc<Self> {
        Arc::new(Self {
            import_file,
            export_choice,
            ..Self::default()
        })
    }

    pub fn import_prompt_count(&self) -> usize {
        self.import_prompts.load(Ordering::SeqCst)
    }

    /// Arguments every export dialog was opened with
    pub fn export_seeds(&self) -> Vec<(Option<PathBuf>, bool)> {
        lock(&self.export_seeds).clone()
    }
}

#[async_trait]
impl TransferDialogs for MockDialogs {
    async fn choose_import_file(&self) -> Option<PathBuf> {
        self.import_prompts.fetch_add(1, Ordering::SeqCst);
        self.import_file.clone()
    }

    async fn choose_export(
        &self,
        last_export_path: Option<PathBuf>,
        picker_capable: bool,
    ) -> Option<ExportChoice> {
        lock(&self.export_seeds).push((last_export_path, picker_capable));
        self.export_choice.clone()
    }
}
