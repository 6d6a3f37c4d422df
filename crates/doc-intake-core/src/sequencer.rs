//! Stepwise classification.
//!
//! A [`Sequencer`] snapshots the grouping of the collection when it is
//! entered and then walks the user through one group per step. Each
//! accepted label is written to every member of the current group in a
//! single [`CollectionStore::set_classification`] call.
//!
//! ```text
//!   enter ──▶ AwaitingInput(0) ──submit──▶ AwaitingInput(1) ──▶ … ──▶ Completed
//!               │ blank label: stays put, EmptyLabel
//!               │ collection emptied: NoDocuments
//!               │ membership changed: StaleStep
//! ```
//!
//! Groups are not recomputed between steps. A sequencer that notices the
//! collection's membership changed since entry refuses further submits
//! instead of labeling a group that no longer reflects the collection.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::SequencerError;
use crate::grouping::{compute_groups, ClassificationGroup, GroupingRules};
use crate::sample::SampleChooser;
use crate::store::CollectionStore;

/// Position of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum StepState {
    AwaitingInput(usize),
    Completed,
}

/// Result of an accepted [`Sequencer::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub group: String,
    pub label: String,
    /// Documents that received the label.
    pub labeled: usize,
    pub next: StepState,
}

/// Classification session over a snapshot of the collection's groups.
#[derive(Debug)]
pub struct Sequencer {
    groups: Vec<ClassificationGroup>,
    state: StepState,
    pending_labels: BTreeMap<usize, String>,
    entered_at: u64,
}

impl Sequencer {
    /// Compute a fresh grouping and start at the first step.
    pub fn enter(
        store: &CollectionStore,
        rules: &GroupingRules,
        chooser: &mut dyn SampleChooser,
    ) -> Result<Self, SequencerError> {
        if store.is_empty() {
            return Err(SequencerError::NoDocuments);
        }

        let groups = compute_groups(store.documents(), rules, chooser);
        if groups.is_empty() {
            return Err(SequencerError::NoMatchingGroups);
        }

        info!(
            steps = groups.len(),
            documents = store.len(),
            "classification started"
        );
        Ok(Self {
            groups,
            state: StepState::AwaitingInput(0),
            pending_labels: BTreeMap::new(),
            entered_at: store.revision(),
        })
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn total_steps(&self) -> usize {
        self.groups.len()
    }

    /// Index of the step awaiting input, `None` once completed.
    pub fn active_step(&self) -> Option<usize> {
        match self.state {
            StepState::AwaitingInput(i) => Some(i),
            StepState::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == StepState::Completed
    }

    pub fn groups(&self) -> &[ClassificationGroup] {
        &self.groups
    }

    pub fn current_group(&self) -> Option<&ClassificationGroup> {
        self.active_step().and_then(|i| self.groups.get(i))
    }

    /// Remember in-progress text for `step`. Out-of-range steps are ignored.
    pub fn set_pending_label(&mut self, step: usize, text: impl Into<String>) {
        if step < self.groups.len() {
            self.pending_labels.insert(step, text.into());
        }
    }

    pub fn pending_label(&self, step: usize) -> Option<&str> {
        self.pending_labels.get(&step).map(String::as_str)
    }

    /// Check whether the sequencer can still accept input against `store`.
    pub fn check(&self, store: &CollectionStore) -> Result<(), SequencerError> {
        if self.is_completed() {
            return Err(SequencerError::Completed);
        }
        if store.is_empty() {
            return Err(SequencerError::NoDocuments);
        }
        if store.revision() != self.entered_at {
            return Err(SequencerError::StaleStep);
        }
        Ok(())
    }

    /// Apply `label` to the current group and advance.
    ///
    /// On any error the sequencer and the store are left untouched.
    pub fn submit(
        &mut self,
        store: &mut CollectionStore,
        label: &str,
    ) -> Result<StepOutcome, SequencerError> {
        if let Err(err) = self.check(store) {
            warn!(error = %err, "classification step refused");
            return Err(err);
        }
        let StepState::AwaitingInput(step) = self.state else {
            return Err(SequencerError::Completed);
        };

        let label = label.trim();
        if label.is_empty() {
            warn!(step, "blank classification label rejected");
            return Err(SequencerError::EmptyLabel);
        }

        let group = &self.groups[step];
        let labeled = store.set_classification(label, &group.member_ids)?;
        let group_name = group.name.clone();
        self.pending_labels.insert(step, label.to_string());

        self.state = if step + 1 < self.groups.len() {
            StepState::AwaitingInput(step + 1)
        } else {
            store.set_classified(true);
            StepState::Completed
        };

        info!(
            step,
            group = %group_name,
            label,
            labeled,
            "classification applied"
        );
        Ok(StepOutcome {
            step,
            group: group_name,
            label: label.to_string(),
            labeled,
            next: self.state,
        })
    }
}
