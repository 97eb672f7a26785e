// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use relay_core::{JobId, JobResult, JobState};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from status reporting
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report channel closed")]
    ChannelClosed,
    #[error("report rejected: {0}")]
    Rejected(String),
}

/// One progress message from an agent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    State { job_id: JobId, state: JobState },
    Completing { job_id: JobId, result: JobResult },
    Completed { job_id: JobId, result: JobResult },
}

/// Delivers job progress to the server.
///
/// Delivery is at-least-once and in call order; the receiving side treats a
/// repeated transition as a no-op.
#[async_trait]
pub trait StatusReporter: Clone + Send + Sync + 'static {
    async fn report_state(&self, job_id: &JobId, state: JobState) -> Result<(), ReportError>;

    async fn report_completing(&self, job_id: &JobId, result: JobResult)
        -> Result<(), ReportError>;

    async fn report_completed(&self, job_id: &JobId, result: JobResult) -> Result<(), ReportError>;
}

/// Reporter that queues reports on a channel drained by the transport task.
#[derive(Clone, Debug)]
pub struct ChannelStatusReporter {
    tx: mpsc::UnboundedSender<StatusReport>,
}

impl ChannelStatusReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StatusReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, report: StatusReport) -> Result<(), ReportError> {
        tracing::debug!(?report, "queueing status report");
        self.tx.send(report).map_err(|_| ReportError::ChannelClosed)
    }
}

#[async_trait]
impl StatusReporter for ChannelStatusReporter {
    async fn report_state(&self, job_id: &JobId, state: JobState) -> Result<(), ReportError> {
        self.send(StatusReport::State { job_id: job_id.clone(), state })
    }

    async fn report_completing(
        &self,
        job_id: &JobId,
        result: JobResult,
    ) -> Result<(), ReportError> {
        self.send(StatusReport::Completing { job_id: job_id.clone(), result })
    }

    async fn report_completed(&self, job_id: &JobId, result: JobResult) -> Result<(), ReportError> {
        self.send(StatusReport::Completed { job_id: job_id.clone(), result })
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ReportError, StatusReport, StatusReporter};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use relay_core::{JobId, JobResult, JobState};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct FakeReporterState {
        reports: Vec<StatusReport>,
        cancel_on: Option<(JobState, CancellationToken)>,
        reject: bool,
    }

    /// Fake reporter for testing
    #[derive(Clone, Default)]
    pub struct FakeStatusReporter {
        inner: Arc<Mutex<FakeReporterState>>,
    }

    impl FakeStatusReporter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Cancel `token` as soon as `state` is reported.
        pub fn cancel_on(&self, state: JobState, token: CancellationToken) {
            self.inner.lock().cancel_on = Some((state, token));
        }

        /// Make every report fail after recording it.
        pub fn reject_all(&self) {
            self.inner.lock().reject = true;
        }

        pub fn reports(&self) -> Vec<StatusReport> {
            self.inner.lock().reports.clone()
        }

        /// Every state transition, including Completing and Completed.
        pub fn states(&self) -> Vec<JobState> {
            self.inner
                .lock()
                .reports
                .iter()
                .map(|r| match r {
                    StatusReport::State { state, .. } => *state,
                    StatusReport::Completing { .. } => JobState::Completing,
                    StatusReport::Completed { .. } => JobState::Completed,
                })
                .collect()
        }

        /// Results carried by Completing and Completed reports.
        pub fn results(&self) -> Vec<JobResult> {
            self.inner
                .lock()
                .reports
                .iter()
                .filter_map(|r| match r {
                    StatusReport::State { .. } => None,
                    StatusReport::Completing { result, .. }
                    | StatusReport::Completed { result, .. } => Some(*result),
                })
                .collect()
        }

        /// The result of the Completed report, if one was made.
        pub fn completed_result(&self) -> Option<JobResult> {
            self.inner.lock().reports.iter().rev().find_map(|r| match r {
                StatusReport::Completed { result, .. } => Some(*result),
                _ => None,
            })
        }

        fn record(&self, report: StatusReport, state: JobState) -> Result<(), ReportError> {
            let mut inner = self.inner.lock();
            inner.reports.push(report);
            if let Some((trigger, token)) = &inner.cancel_on {
                if *trigger == state {
                    token.cancel();
                }
            }
            if inner.reject {
                return Err(ReportError::Rejected("fake rejection".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl StatusReporter for FakeStatusReporter {
        async fn report_state(&self, job_id: &JobId, state: JobState) -> Result<(), ReportError> {
            self.record(StatusReport::State { job_id: job_id.clone(), state }, state)
        }

        async fn report_completing(
            &self,
            job_id: &JobId,
            result: JobResult,
        ) -> Result<(), ReportError> {
            self.record(
                StatusReport::Completing { job_id: job_id.clone(), result },
                JobState::Completing,
            )
        }

        async fn report_completed(
            &self,
            job_id: &JobId,
            result: JobResult,
        ) -> Result<(), ReportError> {
            self.record(
                StatusReport::Completed { job_id: job_id.clone(), result },
                JobState::Completed,
            )
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeStatusReporter;

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
