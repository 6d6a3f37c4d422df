//! The document collection store.
//!
//! [`CollectionStore`] is the single source of truth for the uploaded
//! documents, the active [`Mode`], and the classified flag. Every mutation
//! goes through one of its methods and runs to completion before the next
//! one starts, so no reader can observe a partially applied change.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`add_documents`](CollectionStore::add_documents) | Append one document per upload |
//! | [`delete_document`](CollectionStore::delete_document) | Remove one document, releasing its content |
//! | [`delete_documents`](CollectionStore::delete_documents) | Remove a batch of documents in one step |
//! | [`set_classification`](CollectionStore::set_classification) | Overwrite the label of a set of documents |
//! | [`set_mode`](CollectionStore::set_mode) | Switch the active mode |
//! | [`set_classified`](CollectionStore::set_classified) | Set the classified flag |
//! | [`query_by_ids`](CollectionStore::query_by_ids) | Read documents by id, in collection order |

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::blob::BlobRegistry;
use crate::error::StoreError;
use crate::models::{Document, DocumentId, DocumentSummary, FileUpload, Mode};

/// In-memory, insertion-ordered document collection.
///
/// The store lives for the whole process and starts empty; nothing is
/// persisted.
#[derive(Debug, Default)]
pub struct CollectionStore {
    documents: Vec<Document>,
    mode: Mode,
    classified: bool,
    revision: u64,
    blobs: BlobRegistry,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry that upload handles should be issued from.
    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    /// Append a new document for every upload and return the created ones.
    ///
    /// Zero uploads is a no-op.
    pub fn add_documents<I>(&mut self, files: I) -> &[Document]
    where
        I: IntoIterator<Item = FileUpload>,
    {
        let start = self.documents.len();
        let now = Utc::now();
        self.documents
            .extend(files.into_iter().map(|f| Document::from_upload(f, now)));

        let added = self.documents.len() - start;
        if added > 0 {
            self.revision += 1;
            info!(added, total = self.documents.len(), "documents uploaded");
        }
        &self.documents[start..]
    }

    /// Remove the document with `id`. Returns whether it was present.
    pub fn delete_document(&mut self, id: &DocumentId) -> bool {
        self.delete_documents(std::slice::from_ref(id)) == 1
    }

    /// Remove every document whose id is in `ids`, in a single pass.
    ///
    /// Missing ids are ignored. Each removed document's content handle is
    /// released. Returns the number of documents removed.
    pub fn delete_documents(&mut self, ids: &[DocumentId]) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let targets: HashSet<&DocumentId> = ids.iter().collect();
        let before = self.documents.len();
        self.documents.retain(|doc| !targets.contains(doc.id()));

        let removed = before - self.documents.len();
        if removed > 0 {
            self.revision += 1;
            info!(removed, total = self.documents.len(), "documents deleted");
        }
        removed
    }

    /// Overwrite the classification of every document whose id is in `ids`.
    ///
    /// The label is trimmed before it is stored. Ids that are not in the
    /// collection are skipped, since the caller may be working from a stale
    /// snapshot. Returns the number of documents relabeled.
    pub fn set_classification(
        &mut self,
        label: &str,
        ids: &[DocumentId],
    ) -> Result<usize, StoreError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(StoreError::EmptyLabel);
        }

        let targets: HashSet<&DocumentId> = ids.iter().collect();
        let mut relabeled = 0;
        for doc in self
            .documents
            .iter_mut()
            .filter(|doc| targets.contains(doc.id()))
        {
            doc.set_classification(label);
            relabeled += 1;
        }

        debug!(label, requested = ids.len(), relabeled, "classification set");
        Ok(relabeled)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(from = %self.mode, to = %mode, "mode changed");
        }
        self.mode = mode;
    }

    pub fn is_classified(&self) -> bool {
        self.classified
    }

    pub fn set_classified(&mut self, value: bool) {
        self.classified = value;
    }

    /// Documents whose id is in `ids`, in collection order.
    pub fn query_by_ids(&self, ids: &[DocumentId]) -> Vec<&Document> {
        let targets: HashSet<&DocumentId> = ids.iter().collect();
        self.documents
            .iter()
            .filter(|doc| targets.contains(doc.id()))
            .collect()
    }

    pub fn get(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id() == id)
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.get(id).is_some()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Detached copy of the collection, for work that outlives a borrow.
    pub fn snapshot(&self) -> Vec<DocumentSummary> {
        self.documents.iter().map(Document::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Membership revision: bumped by every add or delete that changed the
    /// set of documents. Relabeling does not bump it.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
