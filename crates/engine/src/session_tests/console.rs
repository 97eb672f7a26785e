// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn echo_interpolates_build_variables() {
    let h = harness_with(|config| config.variable("stage", "deploy"));
    h.run(BuildCommand::echo(&["stage=${stage}", "left ${unknown}"])).await;
    assert_eq!(h.lines(), vec!["stage=deploy", "left ${unknown}"]);
}

#[tokio::test]
async fn export_sets_then_overrides() {
    let h = harness();
    h.run(BuildCommand::compose([
        BuildCommand::export("RELAY_TEST_EXPORT_A", "bar", false),
        BuildCommand::export("RELAY_TEST_EXPORT_A", "baz", false),
    ]))
    .await;
    assert_eq!(
        h.lines(),
        vec![
            "[relay] setting environment variable 'RELAY_TEST_EXPORT_A' to value 'bar'",
            "[relay] overriding environment variable 'RELAY_TEST_EXPORT_A' with value 'baz'",
        ]
    );
}

#[tokio::test]
async fn export_over_process_env_is_override() {
    let h = harness();
    h.run(BuildCommand::export("PATH", "/opt/bin", false)).await;
    assert_eq!(
        h.lines(),
        vec!["[relay] overriding environment variable 'PATH' with value '/opt/bin'"]
    );
}

#[tokio::test]
async fn secure_export_hides_value() {
    let h = harness();
    h.run(BuildCommand::export("RELAY_TEST_EXPORT_B", "hunter2", true)).await;
    assert_eq!(
        h.lines(),
        vec!["[relay] setting environment variable 'RELAY_TEST_EXPORT_B' to value '********'"]
    );
}

#[tokio::test]
async fn export_without_value_prints_current() {
    let h = harness();
    h.run(BuildCommand::compose([
        BuildCommand::export_current("RELAY_TEST_EXPORT_UNSET"),
        BuildCommand::export("RELAY_TEST_EXPORT_C", "v1", false),
        BuildCommand::export_current("RELAY_TEST_EXPORT_C"),
    ]))
    .await;
    assert_eq!(
        h.lines(),
        vec![
            "[relay] setting environment variable 'RELAY_TEST_EXPORT_UNSET' to value 'null'",
            "[relay] setting environment variable 'RELAY_TEST_EXPORT_C' to value 'v1'",
            "[relay] setting environment variable 'RELAY_TEST_EXPORT_C' to value 'v1'",
        ]
    );
}

#[tokio::test]
async fn secrets_are_masked_in_all_later_output() {
    let h = harness();
    h.run(BuildCommand::compose([
        BuildCommand::secret("s3cr3t"),
        BuildCommand::secret_with_substitution("token-123", "$TOKEN"),
        BuildCommand::echo(&["pass=s3cr3t auth=token-123"]),
        BuildCommand::fail("login failed for s3cr3t"),
    ]))
    .await;
    assert_eq!(h.lines(), vec!["pass=****** auth=$TOKEN", "login failed for ******"]);
}

#[tokio::test]
async fn configured_mask_is_used() {
    let h = harness_with(|config| config.secret_mask("[hidden]"));
    h.run(BuildCommand::compose([BuildCommand::secret("pw"), BuildCommand::echo(&["pw"])]))
        .await;
    assert_eq!(h.lines(), vec!["[hidden]"]);
}

// --- exec ---

#[cfg(unix)]
#[tokio::test]
async fn exec_keeps_stdout_and_stderr_interleaved() {
    let h = harness();
    let script = "echo one; sleep 0.2; echo two 1>&2; sleep 0.2; echo three";
    let result = h.run(BuildCommand::exec("sh", &["-c", script])).await;
    assert_eq!(result, JobResult::Passed);
    assert_eq!(h.lines(), vec!["one", "two", "three"]);
}

#[cfg(unix)]
#[tokio::test]
async fn exec_streams_lines_while_running() {
    let h = harness();
    let build = h.run(BuildCommand::exec("sh", &["-c", "echo started; sleep 1; echo finished"]));
    let watch = async {
        for _ in 0..200 {
            if h.console.contains("started") {
                return h.lines();
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        h.lines()
    };

    let (result, seen_while_running) = tokio::join!(build, watch);
    assert_eq!(result, JobResult::Passed);
    assert_eq!(seen_while_running, vec!["started"]);
    assert_eq!(h.lines(), vec!["started", "finished"]);
}

#[cfg(unix)]
#[tokio::test]
async fn exec_sees_exported_variables() {
    let h = harness_with(|config| {
        config.env([("RELAY_TEST_FROM_CONFIG".to_string(), "cfg".to_string())].into())
    });
    h.run(BuildCommand::compose([
        BuildCommand::export("RELAY_TEST_EXEC_VAR", "exported", false),
        BuildCommand::exec("sh", &["-c", "echo $RELAY_TEST_EXEC_VAR $RELAY_TEST_FROM_CONFIG"]),
    ]))
    .await;
    assert_eq!(h.console.last_line().as_deref(), Some("exported cfg"));
}

#[cfg(unix)]
#[tokio::test]
async fn exec_nonzero_exit_fails() {
    let h = harness();
    let result = h
        .run(BuildCommand::compose([
            BuildCommand::exec("sh", &["-c", "exit 3"]),
            BuildCommand::echo(&["skipped"]),
        ]))
        .await;
    assert_eq!(result, JobResult::Failed);
    assert_eq!(h.lines().len(), 1);
    assert!(h.lines()[0].starts_with("Command 'sh' exited with"));
}

#[tokio::test]
async fn exec_missing_program_fails_with_name() {
    let h = harness();
    let result = h.run(BuildCommand::exec("relay-no-such-program", &[])).await;
    assert_eq!(result, JobResult::Failed);
    assert!(h.console.contains("Error happened while attempting to execute 'relay-no-such-program'"));
}

#[tokio::test]
async fn exec_in_missing_working_directory_fails() {
    let h = harness();
    let result = h
        .run(BuildCommand::exec("echo", &["hi"]).with_working_directory("nowhere"))
        .await;
    assert_eq!(result, JobResult::Failed);
    let expected = format!("Working directory \"{}\" is not a directory!", h.path("nowhere").display());
    assert_eq!(h.lines(), vec![expected]);
}

#[cfg(unix)]
#[tokio::test]
async fn exec_runs_in_node_working_directory() {
    let h = harness();
    h.write("sub/marker.txt", "here");
    h.run(BuildCommand::exec("cat", &["marker.txt"]).with_working_directory("sub")).await;
    assert_eq!(h.lines(), vec!["here"]);
}
