//! Import Pipeline
//!
//! Resolves a caller-supplied locator to a readable local file, hands it to
//! the confirmation step and reloads every tab once contacts were imported.
//! Content references owned by another process are first copied into a
//! temporary file.

use crate::refresh::RefreshCoordinator;
use contacts_core::{
    Capabilities, ContentResolver, DocumentPicker, ImportConfirmer, ImportSource, Notifier,
    Permission, PermissionGate, PickerError, PipelineError, TabMask, TempFileAllocator,
    TransferDialogs, INTERCHANGE_MIME_TYPE,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

/// How an import that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    /// Contacts were applied and the views reloaded
    Imported,
    /// The user declined at the confirmation step
    Declined,
    /// The user backed out of the file chooser or picker
    Cancelled,
}

/// Collaborators the import pipeline drives
#[derive(Clone)]
pub struct ImportCollaborators {
    pub resolver: Arc<dyn ContentResolver>,
    pub temp_files: Arc<dyn TempFileAllocator>,
    pub confirmer: Arc<dyn ImportConfirmer>,
    pub permissions: Arc<dyn PermissionGate>,
    pub picker: Arc<dyn DocumentPicker>,
    pub dialogs: Arc<dyn TransferDialogs>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct ImportPipeline {
    capabilities: Capabilities,
    collaborators: ImportCollaborators,
    refresh: Arc<RefreshCoordinator>,
}

impl ImportPipeline {
    pub fn new(
        capabilities: Capabilities,
        collaborators: ImportCollaborators,
        refresh: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            capabilities,
            collaborators,
            refresh,
        }
    }

    /// Import from `locator` and report the result to the user
    pub async fn import_from(&self, locator: &str) -> Result<ImportStatus, PipelineError> {
        let result = self.import_locator(locator).await;
        self.report(&result);
        result
    }

    /// Let the user choose what to import: through the document picker when
    /// the platform has one, otherwise through the in-app file chooser
    pub async fn import_interactive(&self) -> Result<ImportStatus, PipelineError> {
        let result = if self.capabilities.document_picker {
            self.pick_and_import().await
        } else {
            self.choose_and_import().await
        };
        self.report(&result);
        result
    }

    /// Resolve `source` to a file the confirmation step can read
    pub async fn resolve(&self, source: ImportSource) -> Result<PathBuf, PipelineError> {
        match source {
            ImportSource::LocalPath(path) => Ok(path),
            ImportSource::ContentReference(reference) => self.materialize(&reference).await,
            ImportSource::Unsupported(scheme) => Err(PipelineError::UnsupportedFormat { scheme }),
        }
    }

    async fn import_locator(&self, locator: &str) -> Result<ImportStatus, PipelineError> {
        let source = ImportSource::classify(locator);
        debug!("Importing {} source from {:?}", source.kind(), locator);
        let path = self.resolve(source).await?;
        self.confirm(&path).await
    }

    async fn materialize(&self, reference: &Url) -> Result<PathBuf, PipelineError> {
        let temp = self.collaborators.temp_files.allocate().ok_or_else(|| {
            PipelineError::ResourceUnavailable {
                resource: "temporary file".to_string(),
            }
        })?;

        let mut input = self.collaborators.resolver.open_input(reference).await?;
        let mut output = tokio::fs::File::create(&temp).await?;
        let copied = tokio::io::copy(&mut input, &mut output).await?;
        output.flush().await?;

        debug!("Copied {} bytes from {} to {:?}", copied, reference, temp);
        Ok(temp)
    }

    async fn confirm(&self, path: &Path) -> Result<ImportStatus, PipelineError> {
        if !self.collaborators.confirmer.prompt_and_apply(path).await {
            return Ok(ImportStatus::Declined);
        }
        self.refresh.refresh(TabMask::ALL).await;
        Ok(ImportStatus::Imported)
    }

    async fn pick_and_import(&self) -> Result<ImportStatus, PipelineError> {
        match self
            .collaborators
            .picker
            .pick_document(INTERCHANGE_MIME_TYPE)
            .await
        {
            Ok(Some(locator)) => self.import_locator(&locator).await,
            Ok(None) => Ok(ImportStatus::Cancelled),
            Err(PickerError::NoHandler) => Err(PipelineError::FeatureUnavailable {
                feature: "document picker".to_string(),
            }),
            Err(PickerError::Failed { reason }) => Err(PipelineError::generic(reason)),
        }
    }

    async fn choose_and_import(&self) -> Result<ImportStatus, PipelineError> {
        if !self
            .collaborators
            .permissions
            .request(Permission::ReadStorage)
            .await
        {
            return Err(PipelineError::PermissionDenied {
                permission: Permission::ReadStorage,
            });
        }

        match self.collaborators.dialogs.choose_import_file().await {
            Some(path) => self.confirm(&path).await,
            None => Ok(ImportStatus::Cancelled),
        }
    }

    fn report(&self, result: &Result<ImportStatus, PipelineError>) {
        match result {
            Ok(status) => info!("Import finished: {:?}", status),
            Err(e) => {
                warn!("Import failed: {}", e);
                if let Some(notice) = e.notice() {
                    self.collaborators.notifier.notify(notice);
                }
            }
        }
    }
}
