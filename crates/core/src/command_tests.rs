// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::job::JobState;

#[test]
fn dump_indents_four_spaces_per_level() {
    let tree = BuildCommand::compose([
        BuildCommand::new("bar1"),
        BuildCommand::compose([BuildCommand::new("barz")]),
    ]);
    assert_eq!(tree.dump(), "compose\n    bar1\n    compose\n        barz");
}

#[test]
fn dump_renders_args_in_key_order() {
    let tree = BuildCommand::compose([BuildCommand::with_args("mkdirs", [("path", "out")])]);
    assert_eq!(tree.dump(), "compose\n    mkdirs path=out");
}

#[test]
fn dump_of_leaf_has_no_trailing_newline() {
    assert_eq!(BuildCommand::new("echo").dump(), "echo");
}

#[test]
fn default_run_condition_is_passed() {
    assert_eq!(BuildCommand::new("echo").run_condition(), RunIf::Passed);
}

#[test]
fn run_if_sets_condition() {
    let any: RunIf = "any".parse().unwrap();
    let node = BuildCommand::new("echo").run_if(any);
    assert_eq!(node.run_condition(), RunIf::Any);
}

#[yare::parameterized(
    passed     = { "passed", RunIf::Passed },
    failed     = { "failed", RunIf::Failed },
    any        = { "any", RunIf::Any },
    upper      = { "ANY", RunIf::Any },
    whitespace = { " failed ", RunIf::Failed },
)]
fn run_if_parses(input: &str, expected: RunIf) {
    assert_eq!(input.parse::<RunIf>().unwrap(), expected);
}

#[test]
fn run_if_rejects_unknown_text() {
    let err = "sometimes".parse::<RunIf>().unwrap_err();
    assert_eq!(err, RunIfParseError("sometimes".to_string()));
}

#[yare::parameterized(
    passed_on_pass = { RunIf::Passed, JobResult::Passed, true },
    passed_on_fail = { RunIf::Passed, JobResult::Failed, false },
    failed_on_pass = { RunIf::Failed, JobResult::Passed, false },
    failed_on_fail = { RunIf::Failed, JobResult::Failed, true },
    any_on_pass    = { RunIf::Any, JobResult::Passed, true },
    any_on_fail    = { RunIf::Any, JobResult::Failed, true },
)]
fn run_if_admits(condition: RunIf, accumulated: JobResult, expected: bool) {
    assert_eq!(condition.admits(accumulated), expected);
}

#[test]
fn boolean_arg_decodes_true_and_defaults_false() {
    let node = BuildCommand::with_args("foo", [("foo", "true")]);
    assert!(node.boolean_arg("foo"));
    assert!(!node.boolean_arg("bar"));
}

#[yare::parameterized(
    lower  = { "true", true },
    mixed  = { "True", true },
    false_ = { "false", false },
    junk   = { "yes", false },
    empty  = { "", false },
)]
fn boolean_arg_text(raw: &str, expected: bool) {
    let node = BuildCommand::with_args("x", [("flag", raw)]);
    assert_eq!(node.boolean_arg("flag"), expected);
}

#[test]
fn typed_bool_arg_is_flattened() {
    let node = BuildCommand::export("a", "b", true);
    assert_eq!(node.args().get("secure").map(String::as_str), Some("true"));
    assert!(node.boolean_arg("secure"));
}

#[test]
fn array_arg_decodes_typed_array() {
    let node = BuildCommand::exec("ls", &["-l", "a b"]);
    assert_eq!(node.array_arg("args"), vec!["-l".to_string(), "a b".to_string()]);
    assert_eq!(node.args().get("args").map(String::as_str), Some(r#"["-l","a b"]"#));
}

#[test]
fn array_arg_absent_is_empty() {
    assert!(BuildCommand::new("exec").array_arg("args").is_empty());
}

#[test]
fn array_arg_non_array_reads_as_single_element() {
    let node = BuildCommand::with_args("echo", [("line", "plain text")]);
    assert_eq!(node.array_arg("line"), vec!["plain text".to_string()]);
}

#[test]
fn string_arg_absent_is_empty() {
    let node = BuildCommand::fail("boom");
    assert_eq!(node.string_arg("message"), "boom");
    assert_eq!(node.string_arg("missing"), "");
    assert!(node.has_arg("message"));
    assert!(!node.has_arg("missing"));
}

#[test]
fn equality_covers_every_field() {
    let base = BuildCommand::echo(&["hi"]);
    assert_eq!(base, BuildCommand::echo(&["hi"]));
    assert_ne!(base, BuildCommand::echo(&["hi"]).run_if(RunIf::Any));
    assert_ne!(base, BuildCommand::echo(&["hi"]).with_test(BuildCommand::test("-d", "")));
    assert_ne!(base, BuildCommand::echo(&["hi"]).with_on_cancel(BuildCommand::echo(&["bye"])));
    assert_ne!(base, BuildCommand::echo(&["hi"]).with_working_directory("sub"));
}

#[test]
fn child_order_matters_for_equality() {
    let a = BuildCommand::compose([BuildCommand::new("x"), BuildCommand::new("y")]);
    let b = BuildCommand::compose([BuildCommand::new("y"), BuildCommand::new("x")]);
    assert_ne!(a, b);
}

#[test]
fn operation_resolves_known_names() {
    assert_eq!(BuildCommand::report_completing().operation().unwrap(), Operation::ReportCompleting);
    assert_eq!(
        BuildCommand::report_current_status(JobState::Building).string_arg("status"),
        "Building"
    );
    let err = BuildCommand::new("teleport").operation().unwrap_err();
    assert_eq!(err.to_string(), "Unknown command: teleport");
}

#[test]
fn test_output_wraps_command_as_child() {
    let node = BuildCommand::test_output("-eq", "42", BuildCommand::echo(&["42"]));
    assert_eq!(node.sub_commands(), &[BuildCommand::echo(&["42"])]);
    assert_eq!(node.string_arg("flag"), "-eq");
}

#[test]
fn download_file_checksum_url_is_optional() {
    let plain = BuildCommand::download_file("u", "d", "s", None);
    assert!(!plain.has_arg("checksumUrl"));
    let checked = BuildCommand::download_file("u", "d", "s", Some("c"));
    assert_eq!(checked.string_arg("checksumUrl"), "c");
}

#[test]
fn download_dir_is_its_own_operation() {
    let node = BuildCommand::download_dir("u/log.zip", "dest", "s/log", Some("c"));
    assert_eq!(node.name(), "downloadDir");
    assert_eq!(node.operation().unwrap(), Operation::DownloadDir);
    assert_eq!(node.string_arg("src"), "s/log");
    assert_eq!(node.string_arg("checksumUrl"), "c");
}
