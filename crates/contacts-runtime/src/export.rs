//! Export Pipeline
//!
//! Acquires a writable sink, loads the contacts to export and serializes them
//! through the interchange writer. The sink is closed exactly once on every
//! path after acquisition, and each run ends in at most one notice.

use async_trait::async_trait;
use contacts_core::{
    Capabilities, DataAccess, DocumentPicker, ExportDestination, ExportOutcome, ExportRequest,
    ExportSink, ExportTarget, InterchangeWriter, Notice, Notifier, Permission, PermissionGate,
    PickerError, PipelineError, SettingsStore, SourceId, TransferDialogs, INTERCHANGE_MIME_TYPE,
};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

// ----------------------------------------------------------------------------
// File Sink
// ----------------------------------------------------------------------------

/// Buffered sink writing directly into a local file
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create or truncate the file at `path`
    pub async fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }
}

#[async_trait]
impl ExportSink for FileSink {
    async fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes).await
    }

    async fn close(mut self: Box<Self>) -> io::Result<()> {
        self.writer.shutdown().await
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ----------------------------------------------------------------------------
// Pipeline
// ----------------------------------------------------------------------------

/// How an export that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Written(ExportOutcome),
    /// The user backed out before a sink was acquired
    Cancelled,
}

/// Collaborators the export pipeline drives
#[derive(Clone)]
pub struct ExportCollaborators {
    pub data: Arc<dyn DataAccess>,
    pub writer: Arc<dyn InterchangeWriter>,
    pub permissions: Arc<dyn PermissionGate>,
    pub picker: Arc<dyn DocumentPicker>,
    pub dialogs: Arc<dyn TransferDialogs>,
    pub settings: Arc<dyn SettingsStore>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct ExportPipeline {
    capabilities: Capabilities,
    collaborators: ExportCollaborators,
}

impl ExportPipeline {
    pub fn new(capabilities: Capabilities, collaborators: ExportCollaborators) -> Self {
        Self {
            capabilities,
            collaborators,
        }
    }

    /// Export to `request.destination` and report the result to the user
    pub async fn export_to(&self, request: ExportRequest) -> Result<ExportStatus, PipelineError> {
        let result = self.run(&request).await;
        self.report(&result);
        result
    }

    /// Ask the user for a destination, seeded with the last export location,
    /// then export there
    pub async fn export_interactive(&self) -> Result<ExportStatus, PipelineError> {
        let last = self.collaborators.settings.last_export_path();
        let Some(choice) = self
            .collaborators
            .dialogs
            .choose_export(last, self.capabilities.document_picker)
            .await
        else {
            debug!("Export dialog dismissed");
            return Ok(ExportStatus::Cancelled);
        };

        if let Some(folder) = choice
            .destination
            .parent()
            .filter(|folder| !folder.as_os_str().is_empty())
        {
            if let Err(e) = self.collaborators.settings.set_last_export_path(folder) {
                warn!("Could not remember export location: {}", e);
            }
        }

        self.export_to(ExportRequest {
            destination: ExportDestination::new(choice.destination),
            excluded_sources: choice.excluded_sources,
        })
        .await
    }

    async fn run(&self, request: &ExportRequest) -> Result<ExportStatus, PipelineError> {
        let Some(target) = self.acquire(&request.destination).await? else {
            return Ok(ExportStatus::Cancelled);
        };
        debug!("Acquired export target {:?}", target);

        let outcome = self
            .write_and_close(target.into_sink(), &request.excluded_sources)
            .await?;
        Ok(ExportStatus::Written(outcome))
    }

    async fn acquire(
        &self,
        destination: &ExportDestination,
    ) -> Result<Option<ExportTarget>, PipelineError> {
        if self.capabilities.document_picker {
            return match self
                .collaborators
                .picker
                .create_document(&destination.suggested_name(), INTERCHANGE_MIME_TYPE)
                .await
            {
                Ok(Some(sink)) => Ok(Some(ExportTarget::PickedDocument(sink))),
                Ok(None) => Ok(None),
                Err(PickerError::NoHandler) => Err(PipelineError::FeatureUnavailable {
                    feature: "document picker".to_string(),
                }),
                Err(PickerError::Failed { reason }) => Err(PipelineError::generic(reason)),
            };
        }

        if !self
            .collaborators
            .permissions
            .request(Permission::WriteStorage)
            .await
        {
            return Err(PipelineError::PermissionDenied {
                permission: Permission::WriteStorage,
            });
        }

        let sink = FileSink::create(&destination.path).await?;
        Ok(Some(ExportTarget::DirectStream(Box::new(sink))))
    }

    async fn write_and_close(
        &self,
        mut sink: Box<dyn ExportSink>,
        excluded: &HashSet<SourceId>,
    ) -> Result<ExportOutcome, PipelineError> {
        let result = self.write_contacts(sink.as_mut(), excluded).await;

        let description = sink.describe();
        if let Err(e) = sink.close().await {
            warn!("Failed to close export sink {}: {}", description, e);
        }

        result
    }

    async fn write_contacts(
        &self,
        sink: &mut dyn ExportSink,
        excluded: &HashSet<SourceId>,
    ) -> Result<ExportOutcome, PipelineError> {
        let contacts = self
            .collaborators
            .data
            .load_contacts_excluding(excluded)
            .await?;
        if contacts.is_empty() {
            return Err(PipelineError::NoEntries);
        }

        debug!(
            "Writing {} contacts to {} ({} sources excluded)",
            contacts.len(),
            sink.describe(),
            excluded.len()
        );
        Ok(self.collaborators.writer.write(sink, &contacts).await)
    }

    fn report(&self, result: &Result<ExportStatus, PipelineError>) {
        match result {
            Ok(ExportStatus::Written(outcome)) => {
                info!("Export finished: {:?}", outcome);
                self.collaborators.notifier.notify(Notice::from(*outcome));
            }
            Ok(ExportStatus::Cancelled) => debug!("Export cancelled"),
            Err(e) => {
                warn!("Export failed: {}", e);
                if let Some(notice) = e.notice() {
                    self.collaborators.notifier.notify(notice);
                }
            }
        }
    }
}
