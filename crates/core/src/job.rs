//! Job kinds, statuses, and the transition relation.
//!
//! `status_id` values map 1-based onto the seed data in the `job_statuses`
//! database table; every SQL transition guard uses the same relation encoded
//! here, so the database can never hold a transition this module rejects.

use serde::{Deserialize, Serialize};

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// The kinds of background job the platform runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Classify a cleaned review file against an industry's categories and
    /// produce a final review file.
    ReviewProcessing,
    /// Rebuild the per-industry review index.
    IndexUpdate,
}

impl JobKind {
    /// The value stored in the `jobs.kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::ReviewProcessing => "review_processing",
            JobKind::IndexUpdate => "index_update",
        }
    }

    /// Parse the `jobs.kind` column value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "review_processing" => Some(JobKind::ReviewProcessing),
            "index_update" => Some(JobKind::IndexUpdate),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background job execution status.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending = 1,
    Processing = 2,
    Completed = 3,
    Failed = 4,
    Cancelled = 5,
}

impl JobStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Look up a status by its database ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(JobStatus::Pending),
            2 => Some(JobStatus::Processing),
            3 => Some(JobStatus::Completed),
            4 => Some(JobStatus::Failed),
            5 => Some(JobStatus::Cancelled),
            _ => None,
        }
    }

    /// The value used in wire snapshots and query parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Whether this status has no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Whether a job in this status counts against the one-active-job-per-
    /// scope rule.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Processing)
    }

    /// The transition relation:
    ///
    /// ```text
    /// pending    -> processing | failed | cancelled
    /// processing -> completed | failed | cancelled
    /// terminal   -> (nothing)
    /// ```
    ///
    /// `pending -> failed` covers setup errors before execution starts;
    /// `processing -> cancelled` is only reached through an acknowledged
    /// cancellation signal.
    pub fn can_transition(self, to: JobStatus) -> bool {
        match (self, to) {
            (JobStatus::Pending, JobStatus::Processing) => true,
            (JobStatus::Pending, JobStatus::Failed) => true,
            (JobStatus::Pending, JobStatus::Cancelled) => true,
            (JobStatus::Processing, JobStatus::Completed) => true,
            (JobStatus::Processing, JobStatus::Failed) => true,
            (JobStatus::Processing, JobStatus::Cancelled) => true,
            _ => false,
        }
    }
}

impl From<JobStatus> for StatusId {
    fn from(value: JobStatus) -> Self {
        value as StatusId
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [JobStatus; 5] = [
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Failed,
        JobStatus::Cancelled,
    ];

    #[test]
    fn status_ids_match_seed_data() {
        assert_eq!(JobStatus::Pending.id(), 1);
        assert_eq!(JobStatus::Processing.id(), 2);
        assert_eq!(JobStatus::Completed.id(), 3);
        assert_eq!(JobStatus::Failed.id(), 4);
        assert_eq!(JobStatus::Cancelled.id(), 5);
    }

    #[test]
    fn from_id_round_trips() {
        for status in ALL {
            assert_eq!(JobStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(JobStatus::from_id(0), None);
        assert_eq!(JobStatus::from_id(6), None);
    }

    #[test]
    fn kind_round_trips() {
        assert_eq!(
            JobKind::parse(JobKind::ReviewProcessing.as_str()),
            Some(JobKind::ReviewProcessing)
        );
        assert_eq!(
            JobKind::parse(JobKind::IndexUpdate.as_str()),
            Some(JobKind::IndexUpdate)
        );
        assert_eq!(JobKind::parse("unknown"), None);
    }

    #[test]
    fn pending_transitions() {
        assert!(JobStatus::Pending.can_transition(JobStatus::Processing));
        assert!(JobStatus::Pending.can_transition(JobStatus::Failed));
        assert!(JobStatus::Pending.can_transition(JobStatus::Cancelled));
        assert!(!JobStatus::Pending.can_transition(JobStatus::Completed));
        assert!(!JobStatus::Pending.can_transition(JobStatus::Pending));
    }

    #[test]
    fn processing_transitions() {
        assert!(JobStatus::Processing.can_transition(JobStatus::Completed));
        assert!(JobStatus::Processing.can_transition(JobStatus::Failed));
        assert!(JobStatus::Processing.can_transition(JobStatus::Cancelled));
        assert!(!JobStatus::Processing.can_transition(JobStatus::Pending));
        assert!(!JobStatus::Processing.can_transition(JobStatus::Processing));
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(
                    !from.can_transition(to),
                    "{from:?} -> {to:?} must be rejected"
                );
            }
        }
    }

    #[test]
    fn every_path_from_pending_ends_terminal() {
        // Walk every valid transition chain from Pending; each maximal
        // chain must end in a terminal status.
        fn walk(from: JobStatus) {
            let successors: Vec<_> =
                ALL.into_iter().filter(|&to| from.can_transition(to)).collect();
            if successors.is_empty() {
                assert!(from.is_terminal(), "{from:?} is a dead end but not terminal");
                return;
            }
            for next in successors {
                walk(next);
            }
        }
        walk(JobStatus::Pending);
    }

    #[test]
    fn active_statuses_are_exactly_pending_and_processing() {
        for status in ALL {
            assert_eq!(
                status.is_active(),
                matches!(status, JobStatus::Pending | JobStatus::Processing)
            );
            assert_ne!(status.is_active(), status.is_terminal());
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&JobStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
