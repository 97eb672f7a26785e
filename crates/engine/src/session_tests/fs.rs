// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn mkdirs_creates_nested_directories() {
    let h = harness();
    assert_eq!(h.run(BuildCommand::mkdirs("a/b/c")).await, JobResult::Passed);
    assert!(h.path("a/b/c").is_dir());
}

#[tokio::test]
async fn mkdirs_fails_when_directory_exists() {
    let h = harness();
    h.write("taken/file", "x");
    assert_eq!(h.run(BuildCommand::mkdirs("taken")).await, JobResult::Failed);
}

#[tokio::test]
async fn mkdirs_resolves_against_working_directory() {
    let h = harness();
    h.run(BuildCommand::mkdirs("foo").with_working_directory("bar")).await;
    assert!(h.path("bar/foo").is_dir());
}

#[tokio::test]
async fn cleandir_keeps_allowed_paths_and_their_parents() {
    let h = harness();
    h.write("out/keep/a.txt", "a");
    h.write("out/keep/deep/b.txt", "b");
    h.write("out/partial/keep.log", "k");
    h.write("out/partial/drop.log", "d");
    h.write("out/gone/x.txt", "x");
    h.write("out/top.txt", "t");

    let result = h.run(BuildCommand::cleandir("out", &["keep", "partial/keep.log"])).await;

    assert_eq!(result, JobResult::Passed);
    assert!(h.path("out/keep/a.txt").is_file());
    assert!(h.path("out/keep/deep/b.txt").is_file());
    assert!(h.path("out/partial/keep.log").is_file());
    assert!(!h.path("out/partial/drop.log").exists());
    assert!(!h.path("out/gone").exists());
    assert!(!h.path("out/top.txt").exists());
}

#[tokio::test]
async fn cleandir_without_allowed_empties_directory() {
    let h = harness();
    h.write("out/a/b.txt", "b");
    h.write("out/c.txt", "c");
    h.run(BuildCommand::cleandir("out", &[])).await;
    assert!(h.path("out").is_dir());
    assert_eq!(std::fs::read_dir(h.path("out")).unwrap().count(), 0);
}

#[tokio::test]
async fn cleandir_of_missing_directory_fails() {
    let h = harness();
    assert_eq!(h.run(BuildCommand::cleandir("absent", &[])).await, JobResult::Failed);
}

#[tokio::test]
async fn path_test_flags() {
    let h = harness();
    h.write("dir/file.txt", "x");
    let cases = [
        ("-d", "dir", JobResult::Passed),
        ("-d", "", JobResult::Passed),
        ("-d", "dir/file.txt", JobResult::Failed),
        ("-nd", "missing", JobResult::Passed),
        ("-nd", "dir", JobResult::Failed),
        ("-f", "dir/file.txt", JobResult::Passed),
        ("-f", "dir", JobResult::Failed),
        ("-nf", "dir", JobResult::Passed),
        ("-nf", "dir/file.txt", JobResult::Failed),
    ];
    for (flag, left, expected) in cases {
        let result = h.run(BuildCommand::test(flag, left)).await;
        assert_eq!(result, expected, "test {flag} {left:?}");
    }
}

#[tokio::test]
async fn output_test_flags_compare_trimmed_output() {
    let h = harness();
    let cases = [
        ("-eq", "foo", "foo", JobResult::Passed),
        ("-eq", "foo", "  foo  ", JobResult::Passed),
        ("-eq", "foo", "bar", JobResult::Failed),
        ("-neq", "foo", "bar", JobResult::Passed),
        ("-neq", "foo", "foo", JobResult::Failed),
    ];
    for (flag, left, output, expected) in cases {
        let result = h.run(BuildCommand::test_output(flag, left, BuildCommand::echo(&[output]))).await;
        assert_eq!(result, expected, "test {flag} {left:?} against {output:?}");
    }
}

#[tokio::test]
async fn output_test_ignores_operand_failure() {
    let h = harness();
    let operand = BuildCommand::compose([BuildCommand::echo(&["ok"]), BuildCommand::fail("")]);
    let result = h.run(BuildCommand::test_output("-eq", "ok\n[relay] fail failed", operand)).await;
    assert_eq!(result, JobResult::Passed);
    assert!(h.lines().is_empty());
}

#[tokio::test]
async fn unknown_test_flag_fails() {
    let h = harness();
    assert_eq!(h.run(BuildCommand::test("-x", "a")).await, JobResult::Failed);
    assert_eq!(h.lines(), vec!["Unknown test flag: -x"]);
}
