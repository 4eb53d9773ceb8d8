//! Server-side upload jobs, as seen by the client.
//!
//! The client never creates or mutates an `UploadJob`: it only reads what
//! `GET /job-status/{id}` and `GET /jobs/recent` report and mirrors it into
//! `JobCard`s through the `JobTracker`.

use serde::{Deserialize, Serialize};

mod poller;
mod tracker;

pub use poller::{poll_job, JobStatusClient, PollControl, PollEvent, PollOutcome};
pub use tracker::{CardState, JobCard, JobTracker};

/// Lifecycle of a job as reported by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
    /// Server-side transfers that were cancelled on request.
    Canceled,
    /// Any status this client does not know; treated as still running.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Canceled
        )
    }
}

/// Public view of a job record.
///
/// Which optional fields are filled depends on `status`: `progress` and
/// `rows_processed` while processing, the three row counters once completed,
/// `error` once failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadJob {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub rows_total: Option<u64>,
    #[serde(default)]
    pub rows_inserted: Option<u64>,
    #[serde(default)]
    pub rows_skipped: Option<u64>,
    #[serde(default)]
    pub rows_processed: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
}

impl UploadJob {
    /// A freshly accepted job, before the first status poll.
    pub fn accepted(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Processing,
            filename: None,
            label: None,
            progress: Some(0),
            rows_total: None,
            rows_inserted: None,
            rows_skipped: None,
            rows_processed: None,
            error: None,
            created_at: None,
            updated_at: None,
            finished_at: None,
        }
    }

    /// Display name: file name, then label, then the job id.
    pub fn display_name(&self) -> &str {
        self.filename
            .as_deref()
            .or(self.label.as_deref())
            .unwrap_or(&self.job_id)
    }
}

/// Answer of `POST /upload-data` and `POST /transfer/start`.
#[derive(Clone, Debug, Deserialize)]
pub struct JobAccepted {
    pub job_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Answer of `GET /jobs/recent`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RecentJobs {
    #[serde(default)]
    pub jobs: Vec<UploadJob>,
}

/// Entry of `GET /jobs/running`.
#[derive(Clone, Debug, Deserialize)]
pub struct RunningJob {
    pub job_id: String,
    pub status: JobStatus,
}

/// Answer of `GET /jobs/running`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RunningJobs {
    #[serde(default)]
    pub jobs: Vec<RunningJob>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_processing_job() {
        let job: UploadJob = serde_json::from_str(
            r#"{"job_id":"4821","status":"processing","progress":40,"rows_processed":400,
                "filename":"people.csv","error":null}"#,
        )
        .unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, Some(40));
        assert_eq!(job.display_name(), "people.csv");
        assert!(!job.status.is_terminal());
    }

    #[test]
    fn unknown_status_is_not_terminal() {
        let job: UploadJob =
            serde_json::from_str(r#"{"job_id":"1","status":"queued"}"#).unwrap();
        assert_eq!(job.status, JobStatus::Unknown);
        assert!(!job.status.is_terminal());
        assert_eq!(job.display_name(), "1");
    }

    #[test]
    fn terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Canceled.is_terminal());
    }
}
