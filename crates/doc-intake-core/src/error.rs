//! Error taxonomy for the intake core.
//!
//! Every error here is recoverable: the caller reports it and stays in its
//! current state. Operations on ids that are no longer in the collection
//! are not errors at all; they are silently skipped.

use thiserror::Error;

/// Rejected [`CollectionStore`](crate::store::CollectionStore) mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("classification label must not be empty")]
    EmptyLabel,
}

/// Failures of the classification sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    /// The submitted label was blank after trimming. Nothing was written.
    #[error("classification required: please enter a classification type")]
    EmptyLabel,

    /// The collection is empty.
    #[error("no documents: upload documents before classification")]
    NoDocuments,

    /// Documents exist, but no grouping rule matched any of them.
    #[error("no classification groups matched the uploaded documents: return to upload")]
    NoMatchingGroups,

    /// Collection membership changed after the sequencer was entered.
    #[error("collection changed since classification started: re-enter classification")]
    StaleStep,

    /// Every step has already been submitted.
    #[error("classification already complete")]
    Completed,
}

impl SequencerError {
    /// True for the "nothing to do, go back to upload" conditions.
    pub fn is_empty_collection(&self) -> bool {
        matches!(self, Self::NoDocuments | Self::NoMatchingGroups)
    }
}

impl From<StoreError> for SequencerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmptyLabel => SequencerError::EmptyLabel,
        }
    }
}

/// Failures of the filename-rule searches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search prompt must not be empty")]
    EmptyPrompt,
}

/// Invalid grouping rule configuration.
#[derive(Debug, Clone, Error)]
pub enum GroupingError {
    #[error("grouping needs at least one rule")]
    NoRules,

    #[error("grouping rule name must not be empty")]
    EmptyName,

    #[error("duplicate grouping rule name: '{0}'")]
    DuplicateName(String),

    #[error("grouping rule '{rule}': numbered range {min}..={max} is empty")]
    EmptyRange { rule: String, min: u64, max: u64 },

    #[error("grouping rule '{rule}': substring must not be empty")]
    EmptySubstring { rule: String },

    #[error("grouping rule '{rule}': invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}
