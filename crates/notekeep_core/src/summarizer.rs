//! Note summary generation seam.
//!
//! The core never talks to a model provider directly; hosts plug an
//! implementation of [`Summarizer`] into `NoteService`.

use log::warn;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summarizer is not configured")]
    NotConfigured,
    #[error("summarizer request failed: {0}")]
    Failed(String),
}

pub trait Summarizer: Send + Sync {
    /// Produces a summary for the note, or `None` when there is nothing to say.
    fn generate(&self, title: &str, content: &str) -> Result<Option<String>, SummaryError>;
}

/// Summarizer used when no provider is configured. Always yields `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSummarizer;

impl Summarizer for NoopSummarizer {
    fn generate(&self, _title: &str, _content: &str) -> Result<Option<String>, SummaryError> {
        Ok(None)
    }
}

/// Best-effort variant used during note creation: failures are logged and
/// swallowed so they never block the write.
pub(crate) fn summarize_best_effort(
    summarizer: &dyn Summarizer,
    title: &str,
    content: &str,
) -> Option<String> {
    if content.trim().is_empty() {
        return None;
    }
    match summarizer.generate(title, content) {
        Ok(summary) => summary,
        Err(err) => {
            warn!("event=summary_generate module=summarizer status=error error={err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{summarize_best_effort, NoopSummarizer, SummaryError, Summarizer};

    struct Failing;

    impl Summarizer for Failing {
        fn generate(&self, _: &str, _: &str) -> Result<Option<String>, SummaryError> {
            Err(SummaryError::Failed("upstream 503".to_string()))
        }
    }

    struct Echo;

    impl Summarizer for Echo {
        fn generate(&self, title: &str, _: &str) -> Result<Option<String>, SummaryError> {
            Ok(Some(format!("about {title}")))
        }
    }

    #[test]
    fn failures_are_swallowed() {
        assert_eq!(summarize_best_effort(&Failing, "t", "body"), None);
    }

    #[test]
    fn blank_content_skips_the_summarizer() {
        assert_eq!(summarize_best_effort(&Echo, "t", "   "), None);
        assert_eq!(
            summarize_best_effort(&Echo, "t", "body"),
            Some("about t".to_string())
        );
    }

    #[test]
    fn noop_yields_nothing() {
        assert_eq!(NoopSummarizer.generate("t", "c").unwrap(), None);
    }
}
