// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use relay_core::RunIf;

#[tokio::test]
async fn compose_runs_children_in_order() {
    let h = harness();
    let result = h
        .run(BuildCommand::compose([BuildCommand::echo(&["a"]), BuildCommand::echo(&["b", "c"])]))
        .await;
    assert_eq!(result, JobResult::Passed);
    assert_eq!(h.lines(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn failure_skips_passed_siblings_only() {
    let h = harness();
    let result = h
        .run(BuildCommand::compose([
            BuildCommand::echo(&["before"]),
            BuildCommand::fail("boom"),
            BuildCommand::echo(&["skipped"]),
            BuildCommand::echo(&["always"]).run_if(RunIf::Any),
            BuildCommand::echo(&["on failure"]).run_if(RunIf::Failed),
        ]))
        .await;
    assert_eq!(result, JobResult::Failed);
    assert_eq!(h.lines(), vec!["before", "boom", "always", "on failure"]);
}

#[tokio::test]
async fn failed_condition_is_skipped_while_passing() {
    let h = harness();
    let result = h
        .run(BuildCommand::compose([BuildCommand::echo(&["never"]).run_if(RunIf::Failed)]))
        .await;
    assert_eq!(result, JobResult::Passed);
    assert!(h.lines().is_empty());
}

#[tokio::test]
async fn failure_inside_nested_compose_propagates() {
    let h = harness();
    let result = h
        .run(BuildCommand::compose([
            BuildCommand::compose([BuildCommand::fail("inner")]),
            BuildCommand::echo(&["after"]),
        ]))
        .await;
    assert_eq!(result, JobResult::Failed);
    assert_eq!(h.lines(), vec!["inner"]);
}

#[tokio::test]
async fn passing_test_runs_node() {
    let h = harness();
    let result = h
        .run(BuildCommand::echo(&["guarded"]).with_test(BuildCommand::test("-d", "")))
        .await;
    assert_eq!(result, JobResult::Passed);
    assert_eq!(h.lines(), vec!["guarded"]);
}

#[tokio::test]
async fn failing_test_skips_node_without_failing_job() {
    let h = harness();
    let result = h
        .run(BuildCommand::compose([
            BuildCommand::echo(&["guarded"]).with_test(BuildCommand::test("-f", "missing.txt")),
            BuildCommand::echo(&["faulty guard"]).with_test(BuildCommand::fail("not shown")),
            BuildCommand::echo(&["next"]),
        ]))
        .await;
    assert_eq!(result, JobResult::Passed);
    assert_eq!(h.lines(), vec!["next"]);
}

#[tokio::test]
async fn test_output_is_never_shown() {
    let h = harness();
    h.run(
        BuildCommand::echo(&["shown"])
            .with_test(BuildCommand::compose([BuildCommand::echo(&["hidden"])])),
    )
    .await;
    assert_eq!(h.lines(), vec!["shown"]);
}

#[tokio::test]
async fn test_runs_before_run_condition_on_failed_job() {
    let h = harness();
    let result = h
        .run(BuildCommand::compose([
            BuildCommand::fail("first"),
            BuildCommand::echo(&["cleanup"])
                .run_if(RunIf::Failed)
                .with_test(BuildCommand::test("-d", "")),
        ]))
        .await;
    assert_eq!(result, JobResult::Failed);
    assert_eq!(h.lines(), vec!["first", "cleanup"]);
}

#[tokio::test]
async fn unknown_command_fails_with_its_name() {
    let h = harness();
    let result = h.run(BuildCommand::new("frobnicate")).await;
    assert_eq!(result, JobResult::Failed);
    assert_eq!(h.lines(), vec!["Unknown command: frobnicate"]);
}

#[tokio::test]
async fn empty_fail_message_still_explains() {
    let h = harness();
    assert_eq!(h.run(BuildCommand::fail("")).await, JobResult::Failed);
    assert_eq!(h.lines(), vec!["[relay] fail failed"]);
}

#[tokio::test]
async fn malformed_tree_is_rejected_before_any_side_effect() {
    let h = harness();
    let err = h.session.build_encoded("{\"name\": 42").await.unwrap_err();
    assert!(matches!(err, SessionError::MalformedTree(_)));
    assert!(h.reporter.reports().is_empty());
    assert!(h.lines().is_empty());
}

#[tokio::test]
async fn encoded_tree_builds() {
    let h = harness();
    let tree = BuildCommand::compose([BuildCommand::echo(&["over the wire"])]);
    let text = relay_wire::encode(&tree).unwrap();
    assert_eq!(h.session.build_encoded(&text).await.unwrap(), JobResult::Passed);
    assert_eq!(h.lines(), vec!["over the wire"]);
}

// --- status reporting ---

#[tokio::test]
async fn reports_states_then_completion() {
    let h = harness();
    h.run(BuildCommand::compose([
        BuildCommand::report_current_status(JobState::Preparing),
        BuildCommand::report_current_status(JobState::Building),
        BuildCommand::echo(&["work"]),
    ]))
    .await;
    assert_eq!(
        h.reporter.states(),
        vec![JobState::Preparing, JobState::Building, JobState::Completing, JobState::Completed]
    );
    assert_eq!(h.reporter.results(), vec![JobResult::Passed, JobResult::Passed]);
}

#[tokio::test]
async fn backwards_state_report_is_dropped() {
    let h = harness();
    h.run(BuildCommand::compose([
        BuildCommand::report_current_status(JobState::Building),
        BuildCommand::report_current_status(JobState::Preparing),
    ]))
    .await;
    assert_eq!(
        h.reporter.states(),
        vec![JobState::Building, JobState::Completing, JobState::Completed]
    );
}

#[tokio::test]
async fn explicit_completing_is_reported_once() {
    let h = harness();
    h.run(BuildCommand::compose([
        BuildCommand::report_completing(),
        BuildCommand::echo(&["upload logs"]),
    ]))
    .await;
    assert_eq!(h.reporter.states(), vec![JobState::Completing, JobState::Completed]);
}

#[tokio::test]
async fn invalid_status_fails_node() {
    let h = harness();
    let command = BuildCommand::with_args("reportCurrentStatus", [("status", "Sleeping")]);
    assert_eq!(h.run(command).await, JobResult::Failed);
    assert_eq!(h.reporter.states(), vec![JobState::Completing, JobState::Completed]);
}

#[tokio::test]
async fn failed_build_reports_failed_result() {
    let h = harness();
    h.run(BuildCommand::fail("nope")).await;
    assert_eq!(h.reporter.completed_result(), Some(JobResult::Failed));
}

#[tokio::test]
async fn rejected_reports_do_not_fail_build() {
    let h = harness();
    h.reporter.reject_all();
    let result = h
        .run(BuildCommand::compose([
            BuildCommand::report_current_status(JobState::Building),
            BuildCommand::echo(&["still running"]),
        ]))
        .await;
    assert_eq!(result, JobResult::Passed);
    assert_eq!(h.lines(), vec!["still running"]);
    assert_eq!(h.reporter.reports().len(), 3);
}
