//! Per-job status polling.
//!
//! One poll loop is a plain future: sleep, fetch, report, repeat. It ends by
//! itself on a terminal status, on a transport failure, or when the observer
//! answers `PollControl::Stop` (the card was dismissed). The sleep is injected
//! so the browser can use its timers and tests can skip waiting entirely.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};

use super::{JobStatus, UploadJob};
use crate::error::ApiError;

/// Anything able to answer `GET /job-status/{id}`.
#[async_trait(?Send)]
pub trait JobStatusClient {
    async fn job_status(&self, job_id: &str) -> Result<UploadJob, ApiError>;
}

/// What one tick of the loop observed.
#[derive(Clone, Debug, PartialEq)]
pub enum PollEvent {
    Update(UploadJob),
    ConnectionError(ApiError),
}

/// Observer answer after each event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollControl {
    Continue,
    Stop,
}

/// Why a poll loop ended.
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    Terminal(JobStatus),
    TransportFailed(ApiError),
    Detached,
}

/// Polls `job_id` every `interval` until the job reaches a terminal state.
///
/// The first fetch happens after one interval. Every observed record is
/// handed to `on_event` before the terminal check, so the final state is
/// always reported exactly once.
pub async fn poll_job<C, S, F, H>(
    client: &C,
    job_id: &str,
    interval: Duration,
    mut sleep: S,
    mut on_event: H,
) -> PollOutcome
where
    C: JobStatusClient + ?Sized,
    S: FnMut(Duration) -> F,
    F: Future<Output = ()>,
    H: FnMut(PollEvent) -> PollControl,
{
    loop {
        sleep(interval).await;
        match client.job_status(job_id).await {
            Ok(job) => {
                let status = job.status.clone();
                if on_event(PollEvent::Update(job)) == PollControl::Stop {
                    return PollOutcome::Detached;
                }
                if status.is_terminal() {
                    info!("job {} finished: {:?}", job_id, status);
                    return PollOutcome::Terminal(status);
                }
            }
            Err(err) => {
                warn!("status check for job {} failed: {}", job_id, err);
                on_event(PollEvent::ConnectionError(err.clone()));
                return PollOutcome::TransportFailed(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use futures::executor::block_on;
    use futures::future::ready;

    struct Scripted {
        replies: RefCell<VecDeque<Result<UploadJob, ApiError>>>,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<UploadJob, ApiError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl JobStatusClient for Scripted {
        async fn job_status(&self, _job_id: &str) -> Result<UploadJob, ApiError> {
            self.calls.set(self.calls.get() + 1);
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("script exhausted".to_string())))
        }
    }

    fn with_status(status: JobStatus) -> UploadJob {
        UploadJob {
            status,
            ..UploadJob::accepted("1")
        }
    }

    #[test]
    fn stops_on_transport_error() {
        let client = Scripted::new(vec![Err(ApiError::Network("offline".to_string()))]);
        let mut events = Vec::new();
        let outcome = block_on(poll_job(
            &client,
            "1",
            Duration::from_secs(2),
            |_| ready(()),
            |e| {
                events.push(e);
                PollControl::Continue
            },
        ));
        assert!(matches!(outcome, PollOutcome::TransportFailed(_)));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PollEvent::ConnectionError(_)));
    }

    #[test]
    fn detaches_when_observer_stops() {
        let client = Scripted::new(vec![
            Ok(with_status(JobStatus::Processing)),
            Ok(with_status(JobStatus::Processing)),
        ]);
        let outcome = block_on(poll_job(
            &client,
            "1",
            Duration::from_secs(2),
            |_| ready(()),
            |_| PollControl::Stop,
        ));
        assert_eq!(outcome, PollOutcome::Detached);
        assert_eq!(client.calls.get(), 1);
    }

    #[test]
    fn sleeps_before_every_fetch() {
        let client = Scripted::new(vec![
            Ok(with_status(JobStatus::Processing)),
            Ok(with_status(JobStatus::Canceled)),
        ]);
        let sleeps = Cell::new(0);
        let outcome = block_on(poll_job(
            &client,
            "1",
            Duration::from_millis(2000),
            |d| {
                assert_eq!(d, Duration::from_millis(2000));
                sleeps.set(sleeps.get() + 1);
                ready(())
            },
            |_| PollControl::Continue,
        ));
        assert_eq!(outcome, PollOutcome::Terminal(JobStatus::Canceled));
        assert_eq!(sleeps.get(), 2);
    }
}
