//! Browsing helpers: search/filter predicates and selection state.
//!
//! The browse screen shows the collection narrowed by a filename search
//! term and an optional classification filter, and lets the user select
//! documents for bulk deletion. [`BrowseState::reconcile`] keeps that state
//! consistent with a collection that changed underneath it.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::models::{Document, DocumentId};
use crate::store::CollectionStore;

/// Filename search term plus exact-match classification filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseFilter {
    /// Case-insensitive filename substring. Empty matches everything.
    pub search_term: String,
    /// `None` shows every document, classified or not.
    pub classification: Option<String>,
}

impl BrowseFilter {
    pub fn matches(&self, doc: &Document) -> bool {
        let matches_search = doc
            .name()
            .to_lowercase()
            .contains(&self.search_term.to_lowercase());
        let matches_filter = match &self.classification {
            None => true,
            Some(label) => doc.classification() == Some(label.as_str()),
        };
        matches_search && matches_filter
    }
}

/// Documents passing `filter`, in collection order.
pub fn filter_documents<'a>(documents: &'a [Document], filter: &BrowseFilter) -> Vec<&'a Document> {
    documents.iter().filter(|doc| filter.matches(doc)).collect()
}

/// Distinct classification labels in order of first appearance.
pub fn distinct_classifications(documents: &[Document]) -> Vec<&str> {
    let mut labels: Vec<&str> = Vec::new();
    for label in documents.iter().filter_map(Document::classification) {
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

/// Ordered multi-selection of document ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<DocumentId>,
}

impl Selection {
    /// Flip `id` in or out of the selection. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &DocumentId) -> bool {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.clone());
            true
        }
    }

    pub fn is_selected(&self, id: &DocumentId) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> &[DocumentId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that are no longer in the collection. Returns how many.
    pub fn prune(&mut self, store: &CollectionStore) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| store.contains(id));
        before - self.ids.len()
    }
}

/// "Showing X of Y documents".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrowseSummary {
    pub shown: usize,
    pub total: usize,
}

impl fmt::Display for BrowseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {} of {} documents", self.shown, self.total)
    }
}

/// Everything the browse screen keeps between user actions.
#[derive(Debug, Clone, Default)]
pub struct BrowseState {
    pub filter: BrowseFilter,
    pub selection: Selection,
}

impl BrowseState {
    pub fn visible<'a>(&self, store: &'a CollectionStore) -> Vec<&'a Document> {
        filter_documents(store.documents(), &self.filter)
    }

    pub fn summary(&self, store: &CollectionStore) -> BrowseSummary {
        BrowseSummary {
            shown: self.visible(store).len(),
            total: store.len(),
        }
    }

    /// Delete every selected document, then clear the selection.
    ///
    /// Returns the number of documents removed; an empty selection removes
    /// nothing.
    pub fn delete_selected(&mut self, store: &mut CollectionStore) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let removed = store.delete_documents(self.selection.ids());
        info!(
            selected = self.selection.len(),
            removed, "bulk delete of selection"
        );
        self.selection.clear();
        removed
    }

    /// Bring selection and filter back in line with the collection.
    ///
    /// Selected ids that left the collection are dropped, and a
    /// classification filter whose label no document carries any more is
    /// reset to "all".
    pub fn reconcile(&mut self, store: &CollectionStore) {
        self.selection.prune(store);
        let stale_filter = match &self.filter.classification {
            Some(label) => !distinct_classifications(store.documents()).contains(&label.as_str()),
            None => false,
        };
        if stale_filter {
            self.filter.classification = None;
        }
    }
}
