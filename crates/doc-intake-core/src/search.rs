//! Filename-rule searches.
//!
//! Neither search inspects document content. Search by reference image is
//! a lookup table keyed by substrings of the query's filename; search by
//! prompt always returns the same numbered scans. Both operate on a
//! [`DocumentSummary`] snapshot so the caller can run them after an
//! artificial delay without holding a borrow of the store.
//!
//! # Reference-image rules
//!
//! Checked in order against the lower-cased query filename:
//!
//! | Query contains | Returns |
//! |----------------|---------|
//! | `musaddiq` | documents whose name contains `musaddiq` |
//! | `us3` | `id6.jpg`, `lic1.jpg`, `lic2.jpg`, and any `musaddiq` document |
//! | anything else | one uniformly random document |

use serde::Serialize;
use tracing::debug;

use crate::error::SearchError;
use crate::grouping::numbered_index;
use crate::models::DocumentSummary;
use crate::sample::{pick, SampleChooser};

struct ImageRule {
    query_contains: &'static str,
    selects: fn(&str) -> bool,
}

fn is_musaddiq(name: &str) -> bool {
    name.contains("musaddiq")
}

fn is_us3_related(name: &str) -> bool {
    matches!(name, "id6.jpg" | "lic1.jpg" | "lic2.jpg") || is_musaddiq(name)
}

const IMAGE_RULES: &[ImageRule] = &[
    ImageRule {
        query_contains: "musaddiq",
        selects: is_musaddiq,
    },
    ImageRule {
        query_contains: "us3",
        selects: is_us3_related,
    },
];

/// Scan numbers that search by prompt always returns.
pub const PROMPT_RESULT_NUMBERS: [u64; 3] = [6, 9, 10];

/// Outcome of [`match_reference_image`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMatch {
    /// The table key that fired, `None` for the random fallback.
    pub rule: Option<&'static str>,
    pub documents: Vec<DocumentSummary>,
}

/// Look up "similar" documents for a reference image by its filename.
pub fn match_reference_image(
    query_name: &str,
    documents: &[DocumentSummary],
    chooser: &mut dyn SampleChooser,
) -> ImageMatch {
    let query = query_name.to_lowercase();

    if let Some(rule) = IMAGE_RULES
        .iter()
        .find(|r| query.contains(r.query_contains))
    {
        let hits: Vec<DocumentSummary> = documents
            .iter()
            .filter(|d| (rule.selects)(&d.name.to_lowercase()))
            .cloned()
            .collect();
        debug!(rule = rule.query_contains, hits = hits.len(), "image search rule matched");
        return ImageMatch {
            rule: Some(rule.query_contains),
            documents: hits,
        };
    }

    let fallback: Vec<DocumentSummary> = pick(documents, chooser).cloned().into_iter().collect();
    debug!(hits = fallback.len(), "image search fell back to a random document");
    ImageMatch {
        rule: None,
        documents: fallback,
    }
}

/// Documents "matching" a free-text prompt.
///
/// The prompt only has to be non-blank; its text does not affect the
/// result.
pub fn match_prompt(
    prompt: &str,
    documents: &[DocumentSummary],
) -> Result<Vec<DocumentSummary>, SearchError> {
    if prompt.trim().is_empty() {
        return Err(SearchError::EmptyPrompt);
    }
    Ok(documents
        .iter()
        .filter(|d| numbered_index(&d.name).is_some_and(|n| PROMPT_RESULT_NUMBERS.contains(&n)))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileUpload;
    use crate::sample::FixedChooser;
    use crate::store::CollectionStore;

    fn snapshot(names: &[&str]) -> Vec<DocumentSummary> {
        let mut store = CollectionStore::new();
        let uploads: Vec<FileUpload> = names
            .iter()
            .map(|n| FileUpload::new(*n, store.blobs().register(Vec::new())))
            .collect();
        store.add_documents(uploads);
        store.snapshot()
    }

    fn names(docs: &[DocumentSummary]) -> Vec<&str> {
        docs.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_us3_rule() {
        let docs = snapshot(&["id6.jpg", "lic1.jpg", "other.jpg"]);
        let found = match_reference_image("us3.jpg", &docs, &mut FixedChooser(0));
        assert_eq!(found.rule, Some("us3"));
        assert_eq!(names(&found.documents), vec!["id6.jpg", "lic1.jpg"]);
    }

    #[test]
    fn test_us3_rule_includes_musaddiq() {
        let docs = snapshot(&["LIC2.JPG", "musaddiq visa.jpg", "id7.jpg"]);
        let found = match_reference_image("US3.png", &docs, &mut FixedChooser(0));
        assert_eq!(names(&found.documents), vec!["LIC2.JPG", "musaddiq visa.jpg"]);
    }

    #[test]
    fn test_musaddiq_rule_wins_over_us3() {
        let docs = snapshot(&["id6.jpg", "musaddiq uni card.jpg", "musaddiq visa.jpg"]);
        let found = match_reference_image("Musaddiq-us3.JPG", &docs, &mut FixedChooser(0));
        assert_eq!(found.rule, Some("musaddiq"));
        assert_eq!(
            names(&found.documents),
            vec!["musaddiq uni card.jpg", "musaddiq visa.jpg"]
        );
    }

    #[test]
    fn test_fallback_returns_one_document() {
        let docs = snapshot(&["a.jpg", "b.jpg", "c.jpg"]);
        let found = match_reference_image("holiday.png", &docs, &mut FixedChooser(1));
        assert_eq!(found.rule, None);
        assert_eq!(names(&found.documents), vec!["b.jpg"]);
    }

    #[test]
    fn test_fallback_on_empty_collection() {
        let found = match_reference_image("holiday.png", &[], &mut FixedChooser(0));
        assert!(found.documents.is_empty());
    }

    #[test]
    fn test_prompt_ignores_text() {
        let docs = snapshot(&["6.jpg", "7.jpg", "9.png", "10.JPEG", "musaddiq.jpg"]);
        let a = match_prompt("Find all invoices", &docs).unwrap();
        let b = match_prompt("anything at all", &docs).unwrap();
        assert_eq!(names(&a), vec!["6.jpg", "9.png", "10.JPEG"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_blank_prompt_rejected() {
        let docs = snapshot(&["6.jpg"]);
        assert_eq!(match_prompt("  ", &docs), Err(SearchError::EmptyPrompt));
    }
}
