//! Review file access seam.
//!
//! Upload parsing (Excel combine/clean) happens upstream; by the time a
//! job runs, the cleaned file referenced by the review row is
//! line-oriented text. The trait keeps the executors testable and leaves
//! room for richer formats behind the same seam.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::PipelineError;

/// Reads cleaned review files and writes final (classified) ones.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Load review texts from a cleaned review file, one per line.
    async fn load(&self, file_path: &str) -> Result<Vec<String>, PipelineError>;

    /// Write the classified output file: one `label\ttext` row per review.
    async fn write_final(
        &self,
        file_path: &str,
        labeled: &[(String, String)],
    ) -> Result<(), PipelineError>;
}

/// Filesystem-backed source for newline-delimited review files.
#[derive(Debug, Default)]
pub struct FsReviewSource;

#[async_trait]
impl ReviewSource for FsReviewSource {
    async fn load(&self, file_path: &str) -> Result<Vec<String>, PipelineError> {
        let contents = tokio::fs::read_to_string(file_path).await?;
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    async fn write_final(
        &self,
        file_path: &str,
        labeled: &[(String, String)],
    ) -> Result<(), PipelineError> {
        let mut file = tokio::fs::File::create(file_path).await?;
        for (label, text) in labeled {
            file.write_all(format!("{label}\t{text}\n").as_bytes())
                .await?;
        }
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned.txt");
        tokio::fs::write(&path, "first review\n\n  \nsecond review\n")
            .await
            .unwrap();

        let source = FsReviewSource;
        let texts = source.load(path.to_str().unwrap()).await.unwrap();

        assert_eq!(texts, vec!["first review", "second review"]);
    }

    #[tokio::test]
    async fn write_final_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final.txt");

        let source = FsReviewSource;
        let labeled = vec![
            ("service".to_string(), "great staff".to_string()),
            ("price".to_string(), "too expensive".to_string()),
        ];
        source
            .write_final(path.to_str().unwrap(), &labeled)
            .await
            .unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "service\tgreat staff\nprice\ttoo expensive\n");
    }

    #[tokio::test]
    async fn load_missing_file_is_an_io_error() {
        let source = FsReviewSource;
        let result = source.load("/nonexistent/cleaned.txt").await;
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }
}
