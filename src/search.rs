//! Search by reference image and search by prompt, with an artificial delay.
//!
//! Results are decided from a snapshot of the collection at the moment the
//! search is issued and handed back as a [`PendingSearch`]. Awaiting it
//! sleeps for the configured delay and yields the result; the session and
//! its store are not borrowed meanwhile, so navigation keeps working. A
//! pending search cannot be cancelled and always completes.

use std::time::Duration;

use doc_intake_core::error::SearchError;
use doc_intake_core::models::DocumentSummary;
use doc_intake_core::sample::SampleChooser;
use doc_intake_core::search::{match_prompt, match_reference_image, ImageMatch};
use rand::Rng;
use tracing::info;

use crate::config::SearchConfig;

/// Fixed delay plus uniform jitter in `0..=jitter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchDelay {
    pub base: Duration,
    pub jitter: Duration,
}

impl SearchDelay {
    pub fn fixed(base: Duration) -> Self {
        Self {
            base,
            jitter: Duration::ZERO,
        }
    }

    pub fn for_image(config: &SearchConfig) -> Self {
        Self {
            base: config.image_delay(),
            jitter: config.image_jitter(),
        }
    }

    pub fn for_prompt(config: &SearchConfig) -> Self {
        Self::fixed(config.prompt_delay())
    }

    /// Draw the concrete delay for one search.
    pub fn resolve(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.base;
        }
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = rand::rng().random_range(0..=jitter_ms);
        self.base + Duration::from_millis(extra)
    }
}

/// A search whose result is fixed but not yet delivered.
#[derive(Debug)]
#[must_use = "a pending search does nothing until awaited"]
pub struct PendingSearch<T> {
    result: T,
    delay: Duration,
}

impl<T> PendingSearch<T> {
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep out the delay, then hand over the result.
    pub async fn wait(self) -> T {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result
    }
}

/// Issue a search by reference image against `snapshot`.
pub fn issue_image_search(
    query_name: &str,
    snapshot: &[DocumentSummary],
    delay: SearchDelay,
    chooser: &mut dyn SampleChooser,
) -> PendingSearch<ImageMatch> {
    let result = match_reference_image(query_name, snapshot, chooser);
    let delay = delay.resolve();
    info!(
        query = query_name,
        rule = result.rule.unwrap_or("random"),
        hits = result.documents.len(),
        delay_ms = delay.as_millis() as u64,
        "image search issued"
    );
    PendingSearch { result, delay }
}

/// Issue a search by prompt against `snapshot`.
///
/// A blank prompt is rejected up front and starts no search.
pub fn issue_prompt_search(
    prompt: &str,
    snapshot: &[DocumentSummary],
    delay: SearchDelay,
) -> Result<PendingSearch<Vec<DocumentSummary>>, SearchError> {
    let result = match_prompt(prompt, snapshot)?;
    let delay = delay.resolve();
    info!(
        hits = result.len(),
        delay_ms = delay.as_millis() as u64,
        "prompt search issued"
    );
    Ok(PendingSearch { result, delay })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_without_jitter_is_exact() {
        let d = SearchDelay::fixed(Duration::from_millis(500));
        assert_eq!(d.resolve(), Duration::from_millis(500));
        assert_eq!(SearchDelay::default().resolve(), Duration::ZERO);
    }

    #[test]
    fn test_resolve_with_jitter_stays_in_window() {
        let d = SearchDelay {
            base: Duration::from_millis(3000),
            jitter: Duration::from_millis(1000),
        };
        for _ in 0..50 {
            let v = d.resolve();
            assert!(v >= Duration::from_millis(3000));
            assert!(v <= Duration::from_millis(4000));
        }
    }

    #[test]
    fn test_config_delays() {
        let cfg = SearchConfig::default();
        assert_eq!(SearchDelay::for_image(&cfg).base, Duration::from_millis(3000));
        assert_eq!(SearchDelay::for_prompt(&cfg).jitter, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_pending_search_waits_for_delay() {
        let pending = issue_prompt_search(
            "invoices",
            &[],
            SearchDelay::fixed(Duration::from_millis(30)),
        )
        .unwrap();
        assert_eq!(pending.delay(), Duration::from_millis(30));

        let started = std::time::Instant::now();
        let result = pending.wait().await;
        assert!(result.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_blank_prompt_starts_nothing() {
        let err = issue_prompt_search(" ", &[], SearchDelay::default()).unwrap_err();
        assert_eq!(err, SearchError::EmptyPrompt);
    }
}
