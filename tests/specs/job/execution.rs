// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job execution specs
//!
//! Verify a job tree runs end to end and reports its lifecycle.

use crate::prelude::*;
use crate::prelude::assert_eq;

fn typical_job() -> BuildCommand {
    BuildCommand::compose([
        BuildCommand::report_current_status(JobState::Preparing),
        BuildCommand::secret("p4ssw0rd"),
        BuildCommand::export("RELAY_SPEC_STAGE", "build", false),
        BuildCommand::mkdirs("build"),
        BuildCommand::report_current_status(JobState::Building),
        BuildCommand::echo(&["compiling with p4ssw0rd"])
            .with_test(BuildCommand::test("-d", "build")),
        BuildCommand::echo(&["no cache"]).with_test(BuildCommand::test("-d", "cache")),
        BuildCommand::fail("compilation failed"),
        BuildCommand::echo(&["unreachable"]),
        BuildCommand::echo(&["collecting reports"]).run_if(RunIf::Any),
        BuildCommand::echo(&["notifying"]).run_if(RunIf::Failed),
    ])
}

#[test]
fn tree_dump_shows_structure() {
    let tree = BuildCommand::compose([
        BuildCommand::echo(&["hi"]),
        BuildCommand::compose([BuildCommand::mkdirs("build")]),
    ]);
    assert_eq!(
        tree.dump(),
        "compose\n    echo line=[\"hi\"]\n    compose\n        mkdirs path=build"
    );
}

#[tokio::test]
async fn typical_job_runs_and_reports() {
    let agent = Agent::new();
    let (session, reporter, console) = agent.fake_session();

    let result = build_over_wire(&session, &typical_job()).await;

    assert_eq!(result, JobResult::Failed);
    assert_eq!(
        console.lines(),
        vec![
            "[relay] setting environment variable 'RELAY_SPEC_STAGE' to value 'build'".to_string(),
            "compiling with ******".to_string(),
            "compilation failed".to_string(),
            "collecting reports".to_string(),
            "notifying".to_string(),
        ]
    );
    assert_eq!(
        reporter.states(),
        vec![JobState::Preparing, JobState::Building, JobState::Completing, JobState::Completed]
    );
    assert_eq!(reporter.completed_result(), Some(JobResult::Failed));
    assert!(agent.workspace_path("build").is_dir());
}

#[tokio::test]
async fn reports_flow_through_channel_in_order() {
    let agent = Agent::new();
    let (reporter, mut reports) = ChannelStatusReporter::new();
    let session = agent.session(reporter, FakeConsole::new());

    let tree = BuildCommand::compose([
        BuildCommand::report_current_status(JobState::Preparing),
        BuildCommand::report_current_status(JobState::Building),
        BuildCommand::echo(&["ok"]),
    ]);
    assert_eq!(build_over_wire(&session, &tree).await, JobResult::Passed);
    drop(session);

    let mut received = Vec::new();
    while let Some(report) = reports.recv().await {
        received.push(report);
    }
    let job_id = relay_core::JobId::from_string(JOB_ID);
    assert_eq!(
        received,
        vec![
            StatusReport::State { job_id: job_id.clone(), state: JobState::Preparing },
            StatusReport::State { job_id: job_id.clone(), state: JobState::Building },
            StatusReport::Completing { job_id: job_id.clone(), result: JobResult::Passed },
            StatusReport::Completed { job_id, result: JobResult::Passed },
        ]
    );
}

#[tokio::test]
async fn console_log_is_written_to_file() {
    let agent = Agent::new();
    let logs = tempfile::tempdir().unwrap();
    let console = FileConsole::new(logs.path(), JOB_ID);
    let session = agent.session(FakeStatusReporter::new(), console.clone());

    build_over_wire(
        &session,
        &BuildCommand::compose([
            BuildCommand::secret("hunter2"),
            BuildCommand::echo(&["first", "token hunter2"]),
        ]),
    )
    .await;

    let text = std::fs::read_to_string(console.path()).unwrap();
    assert_eq!(text, "first\ntoken ******\n");
}

#[tokio::test]
async fn malformed_payload_runs_nothing() {
    let agent = Agent::new();
    let (session, reporter, console) = agent.fake_session();

    let err = session.build_encoded("{\"subCommands\": 7}").await.unwrap_err();

    assert!(err.to_string().starts_with("malformed command tree"));
    assert!(reporter.reports().is_empty());
    assert!(console.lines().is_empty());
}
