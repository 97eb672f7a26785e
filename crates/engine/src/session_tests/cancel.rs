// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use relay_core::RunIf;

#[tokio::test]
async fn cancel_runs_on_cancel_handlers_from_inside_out() {
    let h = harness();
    h.console.cancel_on_line("start sleeping", h.session.cancel_token());

    let result = h
        .run(
            BuildCommand::compose([BuildCommand::compose([
                BuildCommand::echo(&["start sleeping"])
                    .with_on_cancel(BuildCommand::echo(&["exec canceled"])),
                BuildCommand::echo(&["after sleep"]),
            ])
            .with_on_cancel(BuildCommand::echo(&["inner oncancel"]))])
            .with_on_cancel(BuildCommand::echo(&["outer oncancel"])),
        )
        .await;

    assert_eq!(result, JobResult::Cancelled);
    assert_eq!(
        h.lines(),
        vec!["start sleeping", "exec canceled", "inner oncancel", "outer oncancel"]
    );
    assert_eq!(h.reporter.states(), vec![JobState::Completing, JobState::Completed]);
    assert_eq!(h.reporter.results(), vec![JobResult::Cancelled, JobResult::Cancelled]);
}

#[tokio::test]
async fn cancelled_before_start_runs_only_cleanup() {
    let h = harness();
    h.session.cancel();
    assert!(h.session.is_cancelled());

    let result = h
        .run(
            BuildCommand::compose([BuildCommand::echo(&["work"])])
                .with_on_cancel(BuildCommand::compose([
                    BuildCommand::echo(&["cleanup 1"]),
                    BuildCommand::echo(&["cleanup 2"]),
                ])),
        )
        .await;

    assert_eq!(result, JobResult::Cancelled);
    assert_eq!(h.lines(), vec!["cleanup 1", "cleanup 2"]);
}

#[tokio::test]
async fn node_without_handler_is_skipped_after_cancel() {
    let h = harness();
    h.reporter.cancel_on(JobState::Building, h.session.cancel_token());

    let result = h
        .run(BuildCommand::compose([
            BuildCommand::report_current_status(JobState::Building),
            BuildCommand::echo(&["not run"]),
            BuildCommand::echo(&["not run either"]).run_if(RunIf::Any),
        ]))
        .await;

    assert_eq!(result, JobResult::Cancelled);
    assert!(h.lines().is_empty());
    assert_eq!(
        h.reporter.states(),
        vec![JobState::Building, JobState::Completing, JobState::Completed]
    );
}

#[tokio::test]
async fn handler_runs_even_after_failure() {
    let h = harness();
    h.console.cancel_on_line("trigger", h.session.cancel_token());

    let result = h
        .run(
            BuildCommand::compose([
                BuildCommand::fail("broken"),
                BuildCommand::echo(&["trigger"]).run_if(RunIf::Any),
            ])
            .with_on_cancel(BuildCommand::echo(&["cleanup"])),
        )
        .await;

    assert_eq!(result, JobResult::Cancelled);
    assert_eq!(h.lines(), vec!["broken", "trigger", "cleanup"]);
}

#[tokio::test]
async fn cancel_during_test_diverts_to_handler() {
    let h = harness();
    h.reporter.cancel_on(JobState::Building, h.session.cancel_token());

    let result = h
        .run(
            BuildCommand::echo(&["guarded"])
                .with_test(BuildCommand::report_current_status(JobState::Building))
                .with_on_cancel(BuildCommand::echo(&["cancelled while testing"])),
        )
        .await;

    assert_eq!(result, JobResult::Cancelled);
    assert_eq!(h.lines(), vec!["cancelled while testing"]);
}

#[tokio::test]
async fn cancel_from_another_task_is_observed() {
    let h = harness();
    let token = h.session.cancel_token();
    tokio::spawn(async move { token.cancel() }).await.unwrap();

    let result = h
        .run(BuildCommand::compose([
            BuildCommand::report_current_status(JobState::Building),
            BuildCommand::echo(&["late"]),
        ]))
        .await;

    assert_eq!(result, JobResult::Cancelled);
    assert!(h.lines().is_empty());
}
