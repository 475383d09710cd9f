//! The snapshot wire type pushed to WebSocket subscribers and returned by
//! the polling endpoint.
//!
//! Field presence follows the client contract: `progress` is omitted when
//! the job has not reported any, `final_review_id` appears only on
//! completed jobs, and `error` only on failed ones.

use serde::{Deserialize, Serialize};

use crate::job::JobStatus;
use crate::types::{DbId, Timestamp};

/// Full current state of a job, as observed by subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: DbId,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_review_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: JobStatus) -> JobSnapshot {
        JobSnapshot {
            job_id: 7,
            status,
            progress: None,
            final_review_id: None,
            error: None,
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let value = serde_json::to_value(snapshot(JobStatus::Pending)).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj["job_id"], 7);
        assert_eq!(obj["status"], "pending");
        assert!(obj.contains_key("updated_at"));
        assert!(!obj.contains_key("progress"));
        assert!(!obj.contains_key("final_review_id"));
        assert!(!obj.contains_key("error"));
    }

    #[test]
    fn completed_snapshot_carries_result_reference() {
        let mut snap = snapshot(JobStatus::Completed);
        snap.progress = Some(100.0);
        snap.final_review_id = Some(99);

        let value = serde_json::to_value(snap).unwrap();
        assert_eq!(value["status"], "completed");
        assert_eq!(value["final_review_id"], 99);
        assert_eq!(value["progress"], 100.0);
    }

    #[test]
    fn failed_snapshot_carries_error() {
        let mut snap = snapshot(JobStatus::Failed);
        snap.error = Some("classification failed".into());

        let value = serde_json::to_value(snap).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "classification failed");
        assert!(!value.as_object().unwrap().contains_key("final_review_id"));
    }
}
