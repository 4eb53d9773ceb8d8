use std::collections::{HashMap, HashSet};

use log::debug;

use super::poller::{PollControl, PollEvent};
use super::{JobStatus, UploadJob};

/// Display state of a card. `ConnectionError` is local only: the server may
/// still consider the job running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardState {
    Processing,
    Completed,
    Failed,
    Canceled,
    ConnectionError,
}

impl CardState {
    /// CSS modifier used by the view.
    pub fn css_class(&self) -> &'static str {
        match self {
            CardState::Processing => "job-status-processing",
            CardState::Completed => "job-status-completed",
            CardState::Failed | CardState::ConnectionError => "job-status-failed",
            CardState::Canceled => "job-status-canceled",
        }
    }
}

/// Everything the view needs to draw one job.
#[derive(Clone, Debug, PartialEq)]
pub struct JobCard {
    pub job_id: String,
    pub title: String,
    /// Name of the endpoint preset the job was submitted to.
    pub api: String,
    pub state: CardState,
    pub status_label: String,
    /// 0..=100
    pub progress: u32,
    pub details: String,
    pub error: Option<String>,
    /// Server-side transfers can be cancelled while processing.
    pub cancellable: bool,
}

impl JobCard {
    fn new(job_id: &str, title: &str, api: &str, started_at: Option<&str>) -> Self {
        let started = started_at.unwrap_or("just now");
        Self {
            job_id: job_id.to_string(),
            title: title.to_string(),
            api: api.to_string(),
            state: CardState::Processing,
            status_label: "Processing...".to_string(),
            progress: 0,
            details: format!("Started: {} | API: {}", started, api),
            error: None,
            cancellable: false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, CardState::Processing)
    }

    /// Mirrors a server job record into the card.
    fn apply(&mut self, job: &UploadJob) {
        let when = job
            .finished_at
            .as_deref()
            .or(job.updated_at.as_deref())
            .unwrap_or("-");
        if job.filename.is_none() && job.label.is_some() {
            self.cancellable = true;
        }
        match job.status {
            JobStatus::Completed => {
                self.state = CardState::Completed;
                self.status_label = "Completed".to_string();
                self.progress = 100;
                self.details = format!(
                    "Completed: {} | Total rows: {} | Inserted: {} | Skipped: {} | API: {}",
                    when,
                    count(job.rows_total),
                    count(job.rows_inserted),
                    count(job.rows_skipped),
                    self.api
                );
            }
            JobStatus::Failed => {
                self.state = CardState::Failed;
                self.status_label = "Failed".to_string();
                self.progress = 0;
                self.error = Some(
                    job.error
                        .clone()
                        .filter(|e| !e.is_empty())
                        .unwrap_or_else(|| "Unknown error occurred".to_string()),
                );
                self.details = format!("Failed: {} | API: {}", when, self.api);
            }
            JobStatus::Canceled => {
                self.state = CardState::Canceled;
                self.status_label = "Canceled".to_string();
                self.details = format!("Canceled: {} | API: {}", when, self.api);
            }
            JobStatus::Processing => {
                self.state = CardState::Processing;
                self.status_label = "Processing...".to_string();
                self.progress = job.progress.unwrap_or(0).min(100);
                if let Some(rows) = job.rows_processed {
                    self.details = format!(
                        "Processing... | Rows processed: {} | API: {}",
                        rows, self.api
                    );
                }
            }
            JobStatus::Unknown => {}
        }
    }

    fn mark_connection_error(&mut self) {
        self.state = CardState::ConnectionError;
        self.status_label = "Connection Error".to_string();
        self.details = format!("Error: Could not check job status | API: {}", self.api);
    }
}

fn count(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Registry of job cards and of the poll loops currently running.
///
/// Cards are kept newest first. At most one poll loop may be registered per
/// job id; `begin_polling` refuses a second one.
#[derive(Debug, Default)]
pub struct JobTracker {
    cards: HashMap<String, JobCard>,
    order: Vec<String>,
    polling: HashSet<String>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a card on top of the stack. Existing cards are left untouched.
    pub fn create_card(&mut self, job_id: &str, title: &str, api: &str, started_at: Option<&str>) {
        if self.cards.contains_key(job_id) {
            return;
        }
        self.cards
            .insert(job_id.to_string(), JobCard::new(job_id, title, api, started_at));
        self.order.insert(0, job_id.to_string());
    }

    /// Creates the card if needed, then mirrors `job` into it. Both the poll
    /// loop and the recent-jobs refresh go through here.
    pub fn upsert_from_server(&mut self, job: &UploadJob, api: &str) -> &JobCard {
        if !self.cards.contains_key(&job.job_id) {
            self.order.insert(0, job.job_id.clone());
        }
        let card = self.cards.entry(job.job_id.clone()).or_insert_with(|| {
            JobCard::new(
                &job.job_id,
                job.display_name(),
                api,
                job.created_at.as_deref(),
            )
        });
        card.apply(job);
        card
    }

    /// Applies one poll result. Returns `Stop` when the card is gone.
    pub fn handle_poll_event(&mut self, job_id: &str, event: PollEvent) -> PollControl {
        let Some(card) = self.cards.get_mut(job_id) else {
            debug!("card {} dismissed, detaching poller", job_id);
            return PollControl::Stop;
        };
        match event {
            PollEvent::Update(job) => card.apply(&job),
            PollEvent::ConnectionError(_) => card.mark_connection_error(),
        }
        PollControl::Continue
    }

    pub fn mark_cancellable(&mut self, job_id: &str) {
        if let Some(card) = self.cards.get_mut(job_id) {
            card.cancellable = true;
        }
    }

    pub fn mark_connection_error(&mut self, job_id: &str) {
        if let Some(card) = self.cards.get_mut(job_id) {
            card.mark_connection_error();
        }
    }

    pub fn remove_card(&mut self, job_id: &str) -> bool {
        self.order.retain(|id| id != job_id);
        self.cards.remove(job_id).is_some()
    }

    pub fn card(&self, job_id: &str) -> Option<&JobCard> {
        self.cards.get(job_id)
    }

    /// Cards, newest first.
    pub fn cards(&self) -> impl Iterator<Item = &JobCard> {
        self.order.iter().filter_map(|id| self.cards.get(id))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Registers a poll loop for `job_id`. Returns `false` if one is running.
    pub fn begin_polling(&mut self, job_id: &str) -> bool {
        self.polling.insert(job_id.to_string())
    }

    pub fn end_polling(&mut self, job_id: &str) {
        self.polling.remove(job_id);
    }

    pub fn is_polling(&self, job_id: &str) -> bool {
        self.polling.contains(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, status: JobStatus) -> UploadJob {
        UploadJob {
            status,
            ..UploadJob::accepted(id)
        }
    }

    #[test]
    fn newest_card_first_and_no_duplicates() {
        let mut tracker = JobTracker::new();
        tracker.create_card("1", "a.csv", "B", None);
        tracker.create_card("2", "b.csv", "B", None);
        tracker.create_card("1", "again.csv", "B", None);

        let ids: Vec<_> = tracker.cards().map(|c| c.job_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(tracker.card("1").unwrap().title, "a.csv");
    }

    #[test]
    fn failed_job_shows_server_error() {
        let mut tracker = JobTracker::new();
        let mut failed = job("9", JobStatus::Failed);
        failed.error = Some("duplicate key".to_string());
        let card = tracker.upsert_from_server(&failed, "A");
        assert_eq!(card.state, CardState::Failed);
        assert_eq!(card.error.as_deref(), Some("duplicate key"));
        assert_eq!(card.progress, 0);

        let card = tracker.upsert_from_server(&job("10", JobStatus::Failed), "A");
        assert_eq!(card.error.as_deref(), Some("Unknown error occurred"));
    }

    #[test]
    fn processing_clamps_progress_and_keeps_details_without_counts() {
        let mut tracker = JobTracker::new();
        tracker.create_card("3", "c.json", "C", Some("2026-01-01T00:00:00Z"));
        let mut running = job("3", JobStatus::Processing);
        running.progress = Some(140);
        let card = tracker.upsert_from_server(&running, "C");
        assert_eq!(card.progress, 100);
        assert_eq!(card.details, "Started: 2026-01-01T00:00:00Z | API: C");
    }

    #[test]
    fn poll_event_for_dismissed_card_stops() {
        let mut tracker = JobTracker::new();
        tracker.create_card("5", "e.csv", "B", None);
        assert!(tracker.remove_card("5"));
        assert_eq!(
            tracker.handle_poll_event("5", PollEvent::Update(job("5", JobStatus::Processing))),
            PollControl::Stop
        );
    }

    #[test]
    fn connection_error_is_local_to_one_card() {
        let mut tracker = JobTracker::new();
        tracker.create_card("6", "f.csv", "B", None);
        tracker.create_card("7", "g.csv", "B", None);
        tracker.mark_connection_error("6");
        assert_eq!(tracker.card("6").unwrap().state, CardState::ConnectionError);
        assert_eq!(tracker.card("7").unwrap().state, CardState::Processing);
    }

    #[test]
    fn transfers_are_cancellable() {
        let mut tracker = JobTracker::new();
        let mut transfer = job("11", JobStatus::Processing);
        transfer.label = Some("Transfer to users".to_string());
        assert!(tracker.upsert_from_server(&transfer, "B").cancellable);
        assert_eq!(tracker.card("11").unwrap().title, "Transfer to users");

        tracker.create_card("12", "h.csv", "B", None);
        assert!(!tracker.card("12").unwrap().cancellable);
        tracker.mark_cancellable("12");
        assert!(tracker.card("12").unwrap().cancellable);
    }

    #[test]
    fn polling_registration_is_exclusive() {
        let mut tracker = JobTracker::new();
        assert!(tracker.begin_polling("8"));
        assert!(!tracker.begin_polling("8"));
        tracker.end_polling("8");
        assert!(!tracker.is_polling("8"));
        assert!(tracker.begin_polling("8"));
    }
}
