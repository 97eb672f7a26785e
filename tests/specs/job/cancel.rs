// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job cancellation specs
//!
//! Verify cancellation is observed between nodes and cleanup handlers run.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn cancel_mid_job_runs_cleanup_and_reports_cancelled() {
    let agent = Agent::new();
    agent.file("build/partial.o", "half");
    let (session, reporter, console) = agent.fake_session();
    reporter.cancel_on(JobState::Building, session.cancel_token());

    let tree = BuildCommand::compose([
        BuildCommand::report_current_status(JobState::Building),
        BuildCommand::echo(&["compiling"]),
        BuildCommand::upload_artifact("build", "out"),
    ])
    .with_on_cancel(BuildCommand::compose([
        BuildCommand::echo(&["cleaning up"]),
        BuildCommand::cleandir("build", &[]),
    ]));

    let result = build_over_wire(&session, &tree).await;

    assert_eq!(result, JobResult::Cancelled);
    assert_eq!(console.lines(), vec!["cleaning up".to_string()]);
    assert!(!agent.workspace_path("build/partial.o").exists());
    assert!(!agent.store_path("out").exists());
    assert_eq!(reporter.completed_result(), Some(JobResult::Cancelled));
}

#[tokio::test]
async fn cancel_from_another_task_while_building() {
    let agent = Agent::new();
    let (session, _reporter, console) = agent.fake_session();
    let session = std::sync::Arc::new(session);
    console.cancel_on_line("step 2", session.cancel_token());

    let tree = BuildCommand::compose([
        BuildCommand::echo(&["step 1"]),
        BuildCommand::echo(&["step 2"]),
        BuildCommand::echo(&["step 3"]),
    ]);

    let runner = {
        let session = std::sync::Arc::clone(&session);
        tokio::spawn(async move { session.build(&tree).await })
    };

    assert_eq!(runner.await.unwrap(), JobResult::Cancelled);
    assert_eq!(console.lines(), vec!["step 1".to_string(), "step 2".to_string()]);
}
