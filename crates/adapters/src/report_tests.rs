// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn channel_reporter_preserves_order() {
    let (reporter, mut rx) = ChannelStatusReporter::new();
    let job = JobId::from("job-1");

    reporter.report_state(&job, JobState::Building).await.unwrap();
    reporter.report_completing(&job, JobResult::Passed).await.unwrap();
    reporter.report_completed(&job, JobResult::Passed).await.unwrap();

    assert_eq!(
        rx.recv().await,
        Some(StatusReport::State { job_id: job.clone(), state: JobState::Building })
    );
    assert_eq!(
        rx.recv().await,
        Some(StatusReport::Completing { job_id: job.clone(), result: JobResult::Passed })
    );
    assert_eq!(rx.recv().await, Some(StatusReport::Completed { job_id: job, result: JobResult::Passed }));
}

#[tokio::test]
async fn channel_reporter_errors_when_receiver_dropped() {
    let (reporter, rx) = ChannelStatusReporter::new();
    drop(rx);
    let err = reporter.report_state(&JobId::from("job-1"), JobState::Building).await.unwrap_err();
    assert!(matches!(err, ReportError::ChannelClosed));
}

#[tokio::test]
async fn fake_records_states_and_results() {
    let fake = FakeStatusReporter::new();
    let job = JobId::from("job-1");
    fake.report_state(&job, JobState::Preparing).await.unwrap();
    fake.report_completing(&job, JobResult::Failed).await.unwrap();
    fake.report_completed(&job, JobResult::Failed).await.unwrap();

    assert_eq!(fake.states(), vec![JobState::Preparing, JobState::Completing, JobState::Completed]);
    assert_eq!(fake.results(), vec![JobResult::Failed, JobResult::Failed]);
    assert_eq!(fake.completed_result(), Some(JobResult::Failed));
}

#[tokio::test]
async fn fake_cancels_token_on_trigger_state() {
    let fake = FakeStatusReporter::new();
    let token = CancellationToken::new();
    fake.cancel_on(JobState::Building, token.clone());

    fake.report_state(&JobId::from("job-1"), JobState::Preparing).await.unwrap();
    assert!(!token.is_cancelled());
    fake.report_state(&JobId::from("job-1"), JobState::Building).await.unwrap();
    assert!(token.is_cancelled());
}
