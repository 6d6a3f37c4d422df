//! The application state object.
//!
//! [`IntakeSession`] owns the [`CollectionStore`] and everything that hangs
//! off the active mode: the classification [`Sequencer`] (alive only while
//! in classify mode), the browse filter and selection, and the last results
//! of each search. Front ends hold one session and route every user action
//! through it; nothing here is global.

use anyhow::Result;
use doc_intake_core::browse::{distinct_classifications, BrowseState, BrowseSummary};
use doc_intake_core::error::{SearchError, SequencerError};
use doc_intake_core::grouping::{compute_groups, ClassificationGroup, GroupingRules};
use doc_intake_core::models::{Document, DocumentId, DocumentSummary, FileUpload, Mode};
use doc_intake_core::sample::{RandomChooser, SampleChooser};
use doc_intake_core::search::ImageMatch;
use doc_intake_core::sequencer::{Sequencer, StepOutcome};
use doc_intake_core::store::CollectionStore;
use tracing::{info, warn};

use crate::config::{Config, SearchConfig};
use crate::search::{issue_image_search, issue_prompt_search, PendingSearch, SearchDelay};

pub struct IntakeSession {
    store: CollectionStore,
    rules: GroupingRules,
    search: SearchConfig,
    chooser: Box<dyn SampleChooser + Send>,
    sequencer: Option<Sequencer>,
    browse: BrowseState,
    image_results: Option<ImageMatch>,
    prompt_results: Option<Vec<DocumentSummary>>,
}

impl IntakeSession {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_chooser(config, Box::new(RandomChooser::new()))
    }

    /// Session with a caller-supplied random-choice source.
    pub fn with_chooser(config: &Config, chooser: Box<dyn SampleChooser + Send>) -> Result<Self> {
        Ok(Self {
            store: CollectionStore::new(),
            rules: config.grouping_rules()?,
            search: config.search.clone(),
            chooser,
            sequencer: None,
            browse: BrowseState::default(),
            image_results: None,
            prompt_results: None,
        })
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn mode(&self) -> Mode {
        self.store.mode()
    }

    pub fn rules(&self) -> &GroupingRules {
        &self.rules
    }

    // ── Upload ──────────────────────────────────────────────────────────

    /// Add uploaded files to the collection. Returns how many were added.
    pub fn upload(&mut self, files: Vec<FileUpload>) -> usize {
        self.store.add_documents(files).len()
    }

    /// Leave upload for classification; refused while the collection is
    /// empty.
    pub fn proceed_to_classify(&mut self) -> Result<(), SequencerError> {
        if self.store.is_empty() {
            warn!("proceed to classification refused: no documents");
            return Err(SequencerError::NoDocuments);
        }
        self.set_mode(Mode::Classify)
    }

    // ── Navigation ──────────────────────────────────────────────────────

    /// Switch the active mode. Every transition is allowed.
    ///
    /// Entering classify starts a fresh sequencer over a fresh grouping;
    /// if there is nothing to classify, the mode still switches and the
    /// empty condition is returned. Leaving classify discards the
    /// sequencer.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), SequencerError> {
        self.store.set_mode(mode);
        if mode != Mode::Classify {
            self.sequencer = None;
            if mode == Mode::Browse {
                self.browse.reconcile(&self.store);
            }
            return Ok(());
        }

        self.sequencer = None;
        let sequencer = Sequencer::enter(&self.store, &self.rules, self.chooser.as_mut())?;
        self.sequencer = Some(sequencer);
        Ok(())
    }

    // ── Classification ──────────────────────────────────────────────────

    pub fn sequencer(&self) -> Option<&Sequencer> {
        self.sequencer.as_ref()
    }

    pub fn sequencer_mut(&mut self) -> Option<&mut Sequencer> {
        self.sequencer.as_mut()
    }

    /// Preview of the grouping, without entering classify mode.
    pub fn preview_groups(&mut self) -> Vec<ClassificationGroup> {
        compute_groups(self.store.documents(), &self.rules, self.chooser.as_mut())
    }

    /// Submit a label for the active classification step.
    pub fn submit_label(&mut self, label: &str) -> Result<StepOutcome, SequencerError> {
        let Some(sequencer) = self.sequencer.as_mut() else {
            return Err(if self.store.is_empty() {
                SequencerError::NoDocuments
            } else {
                SequencerError::NoMatchingGroups
            });
        };
        sequencer.submit(&mut self.store, label)
    }

    // ── Browse ──────────────────────────────────────────────────────────

    pub fn browse(&self) -> &BrowseState {
        &self.browse
    }

    pub fn browse_mut(&mut self) -> &mut BrowseState {
        &mut self.browse
    }

    pub fn visible_documents(&self) -> Vec<&Document> {
        self.browse.visible(&self.store)
    }

    pub fn browse_summary(&self) -> BrowseSummary {
        self.browse.summary(&self.store)
    }

    pub fn classifications(&self) -> Vec<&str> {
        distinct_classifications(self.store.documents())
    }

    pub fn toggle_selected(&mut self, id: &DocumentId) -> bool {
        self.browse.selection.toggle(id)
    }

    /// Delete the current selection. Returns the number removed.
    pub fn delete_selected(&mut self) -> usize {
        let removed = self.browse.delete_selected(&mut self.store);
        self.browse.reconcile(&self.store);
        removed
    }

    pub fn delete_document(&mut self, id: &DocumentId) -> bool {
        let removed = self.store.delete_document(id);
        self.browse.reconcile(&self.store);
        removed
    }

    pub fn delete_documents(&mut self, ids: &[DocumentId]) -> usize {
        let removed = self.store.delete_documents(ids);
        self.browse.reconcile(&self.store);
        removed
    }

    // ── Search ──────────────────────────────────────────────────────────

    /// Start a search by reference image. Await the returned search, then
    /// hand its result to [`record_image_results`](Self::record_image_results).
    pub fn search_by_image(&mut self, query_name: &str) -> PendingSearch<ImageMatch> {
        let snapshot = self.store.snapshot();
        issue_image_search(
            query_name,
            &snapshot,
            SearchDelay::for_image(&self.search),
            self.chooser.as_mut(),
        )
    }

    /// Start a search by prompt. A blank prompt starts nothing.
    pub fn search_by_prompt(
        &mut self,
        prompt: &str,
    ) -> Result<PendingSearch<Vec<DocumentSummary>>, SearchError> {
        let snapshot = self.store.snapshot();
        issue_prompt_search(prompt, &snapshot, SearchDelay::for_prompt(&self.search))
    }

    /// Store a completed image search, replacing whatever was there.
    pub fn record_image_results(&mut self, results: ImageMatch) {
        info!(hits = results.documents.len(), "image search results updated");
        self.image_results = Some(results);
    }

    /// Store a completed prompt search, replacing whatever was there.
    pub fn record_prompt_results(&mut self, results: Vec<DocumentSummary>) {
        info!(hits = results.len(), "prompt search results updated");
        self.prompt_results = Some(results);
    }

    pub fn image_results(&self) -> Option<&ImageMatch> {
        self.image_results.as_ref()
    }

    pub fn prompt_results(&self) -> Option<&[DocumentSummary]> {
        self.prompt_results.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_intake_core::sample::FixedChooser;

    fn session() -> IntakeSession {
        let config = Config {
            search: SearchConfig::immediate(),
            ..Config::minimal()
        };
        IntakeSession::with_chooser(&config, Box::new(FixedChooser(0))).unwrap()
    }

    fn upload(session: &mut IntakeSession, names: &[&str]) {
        let files: Vec<FileUpload> = names
            .iter()
            .map(|n| FileUpload::new(*n, session.store().blobs().register(Vec::new())))
            .collect();
        session.upload(files);
    }

    #[test]
    fn test_proceed_refused_when_empty() {
        let mut s = session();
        assert_eq!(s.proceed_to_classify(), Err(SequencerError::NoDocuments));
        assert_eq!(s.mode(), Mode::Upload);
    }

    #[test]
    fn test_entering_classify_with_nothing_to_group() {
        let mut s = session();
        upload(&mut s, &["holiday.jpg"]);
        assert_eq!(s.set_mode(Mode::Classify), Err(SequencerError::NoMatchingGroups));
        assert_eq!(s.mode(), Mode::Classify);
        assert!(s.sequencer().is_none());
        assert_eq!(s.submit_label("x"), Err(SequencerError::NoMatchingGroups));
    }

    #[test]
    fn test_leaving_classify_discards_sequencer() {
        let mut s = session();
        upload(&mut s, &["1.png", "musaddiq a.jpg"]);
        s.proceed_to_classify().unwrap();
        s.submit_label("ID").unwrap();
        assert_eq!(s.sequencer().unwrap().active_step(), Some(1));

        s.set_mode(Mode::SearchPrompt).unwrap();
        assert!(s.sequencer().is_none());

        s.set_mode(Mode::Classify).unwrap();
        assert_eq!(s.sequencer().unwrap().active_step(), Some(0));
    }

    #[test]
    fn test_delete_prunes_selection() {
        let mut s = session();
        upload(&mut s, &["a.png", "b.png"]);
        let ids: Vec<DocumentId> = s.store().documents().iter().map(|d| d.id().clone()).collect();
        s.toggle_selected(&ids[0]);
        s.toggle_selected(&ids[1]);

        assert!(s.delete_document(&ids[0]));
        assert_eq!(s.browse().selection.ids(), &ids[1..]);
        assert_eq!(s.delete_selected(), 1);
        assert!(s.store().is_empty());
        assert_eq!(s.store().blobs().live_count(), 0);
    }
}
