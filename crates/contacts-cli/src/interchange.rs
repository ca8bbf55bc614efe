//! JSON-lines interchange
//!
//! The terminal host exchanges contacts as one JSON object per line. The
//! writer serializes into any export sink; the importer parses a resolved
//! file, asks for confirmation and appends the result to the contact store.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use contacts_core::{Contact, ContactList, ExportOutcome, ExportSink, ImportConfirmer, InterchangeWriter};
use tracing::{debug, info, warn};

use crate::prompt::Prompt;
use crate::store::JsonContactStore;

// ----------------------------------------------------------------------------
// Writer
// ----------------------------------------------------------------------------

pub struct JsonLinesWriter;

#[async_trait]
impl InterchangeWriter for JsonLinesWriter {
    async fn write(&self, sink: &mut dyn ExportSink, contacts: &[Contact]) -> ExportOutcome {
        let mut written = 0usize;
        let mut failed = 0usize;

        for contact in contacts {
            let mut line = match serde_json::to_vec(contact) {
                Ok(line) => line,
                Err(e) => {
                    warn!("Skipping contact {}: {}", contact.id, e);
                    failed += 1;
                    continue;
                }
            };
            line.push(b'\n');

            if let Err(e) = sink.write(&line).await {
                warn!("Write to {} failed: {}", sink.describe(), e);
                failed += contacts.len() - written - failed;
                break;
            }
            written += 1;
        }

        debug!("Wrote {} contacts, {} failed", written, failed);
        match (written, failed) {
            (_, 0) => ExportOutcome::AllSucceeded,
            (0, _) => ExportOutcome::Failed,
            _ => ExportOutcome::PartiallySucceeded,
        }
    }
}

// ----------------------------------------------------------------------------
// Importer
// ----------------------------------------------------------------------------

/// Parse JSON-lines `text`; returns the contacts and the number of bad lines
pub fn parse_contacts(text: &str) -> (ContactList, usize) {
    let mut contacts = Vec::new();
    let mut invalid = 0;
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Contact>(line) {
            Ok(contact) => contacts.push(contact),
            Err(e) => {
                debug!("Line {} is not a contact: {}", number + 1, e);
                invalid += 1;
            }
        }
    }
    (contacts, invalid)
}

pub struct JsonLinesImporter {
    store: Arc<JsonContactStore>,
    prompt: Arc<Prompt>,
    auto_confirm: bool,
}

impl JsonLinesImporter {
    pub fn new(store: Arc<JsonContactStore>, prompt: Arc<Prompt>, auto_confirm: bool) -> Self {
        Self {
            store,
            prompt,
            auto_confirm,
        }
    }
}

#[async_trait]
impl ImportConfirmer for JsonLinesImporter {
    async fn prompt_and_apply(&self, path: &Path) -> bool {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                return false;
            }
        };

        let (contacts, invalid) = parse_contacts(&text);
        if invalid > 0 {
            warn!("Ignoring {} malformed lines in {}", invalid, path.display());
        }
        if contacts.is_empty() {
            println!("No contacts found in {}", path.display());
            return false;
        }

        let question = format!(
            "Import {} contacts from {}? [y/N] ",
            contacts.len(),
            path.display()
        );
        if !self.auto_confirm && !self.prompt.confirm(&question).await {
            info!("Import of {} declined", path.display());
            return false;
        }

        match self.store.append(contacts).await {
            Ok(added) => {
                println!("Imported {} contacts", added);
                true
            }
            Err(e) => {
                warn!("Failed to store imported contacts: {}", e);
                false
            }
        }
    }
}
