//! Executor for `review_processing` jobs.
//!
//! Loads the cleaned review file, classifies its reviews in batches
//! against the industry's categories, writes the final file next to the
//! cleaned one, and records the final review row — which becomes the
//! job's `result_ref`.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use reviewhub_core::job::JobKind;
use reviewhub_db::models::job::Job;
use reviewhub_db::models::review::{stage, NewReview};
use reviewhub_db::repositories::{IndustryRepo, ReviewRepo};
use reviewhub_db::DbPool;

use crate::classifier::Classifier;
use crate::context::JobContext;
use crate::error::PipelineError;
use crate::executor::{JobExecutor, JobOutcome};
use crate::source::ReviewSource;

/// Reviews classified per checkpoint.
const BATCH_SIZE: usize = 20;

/// Progress after the cleaned file is loaded.
const PROGRESS_LOADED: f32 = 10.0;

/// Progress when classification finishes (writing and recording take the
/// rest).
const PROGRESS_CLASSIFIED: f32 = 90.0;

pub struct ReviewProcessingExecutor {
    pool: DbPool,
    source: Arc<dyn ReviewSource>,
    classifier: Arc<dyn Classifier>,
}

impl ReviewProcessingExecutor {
    pub fn new(
        pool: DbPool,
        source: Arc<dyn ReviewSource>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            pool,
            source,
            classifier,
        }
    }
}

#[async_trait]
impl JobExecutor for ReviewProcessingExecutor {
    fn kind(&self) -> JobKind {
        JobKind::ReviewProcessing
    }

    async fn execute(&self, ctx: &JobContext, job: &Job) -> Result<JobOutcome, PipelineError> {
        let cleaned_id = job.new_cleaned_id.ok_or_else(|| {
            PipelineError::Failed("review_processing job has no cleaned review".into())
        })?;

        let cleaned = ReviewRepo::find_by_id(&self.pool, cleaned_id, job.owner_id)
            .await?
            .ok_or_else(|| {
                PipelineError::Failed(format!("cleaned review {cleaned_id} not found"))
            })?;

        let categories: Vec<String> = IndustryRepo::categories(&self.pool, job.industry_id)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();

        ctx.checkpoint()?;

        let texts = self.source.load(&cleaned.file_path).await?;
        if texts.is_empty() {
            return Err(PipelineError::Failed(format!(
                "cleaned review file {} contains no reviews",
                cleaned.file_path
            )));
        }
        let total = texts.len();
        ctx.report_progress(PROGRESS_LOADED).await;

        tracing::info!(
            job_id = ctx.job_id(),
            total_reviews = total,
            "Starting review classification",
        );

        let mut labeled = Vec::with_capacity(total);
        for batch in texts.chunks(BATCH_SIZE) {
            ctx.checkpoint()?;

            let labels = self.classifier.classify(&categories, batch).await?;
            if labels.len() != batch.len() {
                return Err(PipelineError::Failed(format!(
                    "classifier returned {} labels for {} reviews",
                    labels.len(),
                    batch.len()
                )));
            }
            labeled.extend(labels.into_iter().zip(batch.iter().cloned()));

            let done = labeled.len() as f32 / total as f32;
            ctx.report_progress(PROGRESS_LOADED + (PROGRESS_CLASSIFIED - PROGRESS_LOADED) * done)
                .await;
        }

        ctx.checkpoint()?;

        let output_path = final_output_path(&cleaned.file_path);
        self.source.write_final(&output_path, &labeled).await?;

        let final_review = ReviewRepo::create(
            &self.pool,
            &NewReview {
                display_name: &final_display_name(&cleaned.display_name),
                industry_id: job.industry_id,
                stage: stage::FINAL,
                file_path: &output_path,
                parent_id: Some(cleaned.id),
                owner_id: job.owner_id,
            },
        )
        .await?;

        Ok(JobOutcome {
            result_ref: final_review.id,
        })
    }
}

/// Place the final file next to the cleaned one: `foo.txt` -> `foo_final.txt`.
fn final_output_path(cleaned_path: &str) -> String {
    let path = Path::new(cleaned_path);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("reviews");
    let file_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_final.{ext}"),
        None => format!("{stem}_final"),
    };
    path.with_file_name(file_name).to_string_lossy().into_owned()
}

/// Derive the final review's display name from the cleaned one.
fn final_display_name(cleaned_name: &str) -> String {
    let replaced = cleaned_name.replace("Cleaned", "Final");
    if replaced != cleaned_name {
        replaced
    } else {
        format!("{cleaned_name} (final)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_keeps_directory_and_extension() {
        assert_eq!(
            final_output_path("/data/u1/hotels/cleaned_march.txt"),
            "/data/u1/hotels/cleaned_march_final.txt"
        );
        assert_eq!(final_output_path("reviews"), "reviews_final");
    }

    #[test]
    fn display_name_prefers_cleaned_to_final_rewrite() {
        assert_eq!(final_display_name("March Cleaned"), "March Final");
        assert_eq!(final_display_name("March upload"), "March upload (final)");
    }
}
