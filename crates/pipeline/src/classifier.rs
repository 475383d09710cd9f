//! The classification seam.
//!
//! The production classifier calls an LLM with the industry's category
//! taxonomy; that integration lives outside this repository. The pipeline
//! only depends on this trait, and [`UncategorizedClassifier`] keeps the
//! system operational when no real classifier is wired up.

use async_trait::async_trait;

use crate::error::PipelineError;

/// Label fallback used when no category can be assigned.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Assigns one category name to each review text.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a batch of review texts against the given category names.
    ///
    /// Returns exactly one label per input text, in order.
    async fn classify(
        &self,
        categories: &[String],
        texts: &[String],
    ) -> Result<Vec<String>, PipelineError>;
}

/// Fallback classifier that labels every review [`UNCATEGORIZED`].
///
/// Keeps the pipeline runnable without the external LLM integration, the
/// same way the original system falls back to a dummy retriever when no
/// index exists.
#[derive(Debug, Default)]
pub struct UncategorizedClassifier;

#[async_trait]
impl Classifier for UncategorizedClassifier {
    async fn classify(
        &self,
        _categories: &[String],
        texts: &[String],
    ) -> Result<Vec<String>, PipelineError> {
        Ok(vec![UNCATEGORIZED.to_string(); texts.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fallback_labels_every_text() {
        let classifier = UncategorizedClassifier;
        let texts = vec!["good".to_string(), "bad".to_string()];

        let labels = classifier
            .classify(&["service".to_string()], &texts)
            .await
            .unwrap();

        assert_eq!(labels, vec![UNCATEGORIZED, UNCATEGORIZED]);
    }
}
