use crate::types::DocumentState;
use dashmap::DashMap;
use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, Url};

/// Text of the documents the editor has open.
///
/// Open content takes precedence over the file on disk when the container is
/// analyzed, so unsaved edits are navigable.
#[derive(Default)]
pub struct DocumentManager {
    documents: DashMap<Url, DocumentState>,
}

impl DocumentManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, uri: Url, content: String, version: i32) {
        tracing::debug!(%uri, version, "Document opened");
        self.documents.insert(uri, DocumentState::new(content, version));
    }

    /// Apply a full-sync change. Changes older than the stored version are
    /// dropped.
    pub fn change(&self, uri: &Url, changes: Vec<TextDocumentContentChangeEvent>, version: i32) {
        let Some(mut entry) = self.documents.get_mut(uri) else {
            tracing::debug!(%uri, "Change for unknown document");
            return;
        };
        if version < entry.version {
            tracing::debug!(%uri, version, current = entry.version, "Stale document change");
            return;
        }

        // Full sync: the last whole-document change is the new text.
        if let Some(change) = changes.into_iter().rev().find(|c| c.range.is_none()) {
            entry.content = change.text;
        }
        entry.version = version;
    }

    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    pub fn content(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|entry| entry.content.clone())
    }
}
