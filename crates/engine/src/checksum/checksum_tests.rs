// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use relay_adapters::ServerStatus;

// --- manifest ---

#[test]
fn parse_reads_pairs_and_skips_comments() {
    let manifest = ChecksumManifest::parse(
        "# generated\n\n! legacy comment\ns/log/a = abc\n./s/log/b=def\n",
    )
    .unwrap();
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.get("s/log/a"), Some("abc"));
    assert_eq!(manifest.get("s/log/b"), Some("def"));
    assert_eq!(manifest.get("/s/log/b"), Some("def"));
}

#[yare::parameterized(
    no_equals = { "foo.jar\n", 1 },
    empty_key = { "ok=1\n=abc\n", 2 },
)]
fn parse_rejects_malformed_lines(text: &str, line: usize) {
    match ChecksumManifest::parse(text) {
        Err(ChecksumError::Malformed { line: got, .. }) => assert_eq!(got, line),
        other => panic!("expected malformed error, got {other:?}"),
    }
}

#[test]
fn load_missing_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(ChecksumManifest::load(&dir.path().join("absent")).unwrap(), None);
}

#[test]
fn load_malformed_file_is_error_not_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("md5.checksum");
    std::fs::write(&path, "garbage").unwrap();
    assert!(matches!(ChecksumManifest::load(&path), Err(ChecksumError::Malformed { .. })));
}

#[test]
fn digest_for_distinguishes_absent_manifest_from_absent_entry() {
    let manifest = ChecksumManifest::parse("a=1").unwrap();

    let no_manifest: Option<&ChecksumManifest> = None;
    assert_eq!(digest_for(no_manifest, "a"), None);
    assert!(no_manifest.is_none());

    assert_eq!(digest_for(Some(&manifest), "b"), None);
    assert!(!manifest.contains("b"));
    assert_eq!(digest_for(Some(&manifest), "a"), Some("1"));
}

#[test]
fn render_is_sorted_and_reparses() {
    let mut manifest = ChecksumManifest::new();
    manifest.insert("z/file", "2");
    manifest.insert("a/file", "1");
    assert_eq!(manifest.render(), "a/file=1\nz/file=2\n");
    assert_eq!(ChecksumManifest::parse(&manifest.render()).unwrap(), manifest);
}

#[test]
fn write_to_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep/er/md5.checksum");
    let mut manifest = ChecksumManifest::new();
    manifest.insert("x", "y");
    manifest.write_to(&path).unwrap();
    assert_eq!(ChecksumManifest::load(&path).unwrap(), Some(manifest));
}

// --- digests ---

#[test]
fn digest_file_matches_digest_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f");
    std::fs::write(&path, b"some content").unwrap();
    assert_eq!(digest_file(&path).unwrap(), digest_bytes(b"some content"));
    assert_eq!(
        digest_bytes(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

// --- handler decision table ---

struct HandlerFixture {
    _dir: tempfile::TempDir,
    handler: ChecksumFileHandler,
}

fn handler_with_existing_manifest() -> HandlerFixture {
    let dir = tempfile::tempdir().unwrap();
    let handler = ChecksumFileHandler::new(dir.path().join("md5.checksum"));
    handler.handle_body(b"old=1\n").unwrap();
    HandlerFixture { _dir: dir, handler }
}

#[yare::parameterized(
    ok           = { ServerStatus::Ok, true, true, false },
    not_modified = { ServerStatus::NotModified, true, true, false },
    not_found    = { ServerStatus::NotFound, true, false, true },
    forbidden    = { ServerStatus::Forbidden, false, true, false },
    server_error = { ServerStatus::Other(500), false, true, false },
)]
fn handle_result_decision_table(
    status: ServerStatus,
    expected: bool,
    manifest_remains: bool,
    warns: bool,
) {
    let fixture = handler_with_existing_manifest();
    let mut warnings = Vec::new();

    let success = fixture.handler.handle_result(status, |w| warnings.push(w.to_string()));

    assert_eq!(success, expected);
    assert_eq!(fixture.handler.checksum_file().exists(), manifest_remains);
    assert_eq!(!warnings.is_empty(), warns);
    if manifest_remains {
        let text = std::fs::read_to_string(fixture.handler.checksum_file()).unwrap();
        assert_eq!(text, "old=1\n");
    }
}

#[test]
fn not_found_without_local_manifest_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let handler = ChecksumFileHandler::new(dir.path().join("md5.checksum"));
    let mut warnings = Vec::new();
    assert!(handler.handle_result(ServerStatus::NotFound, |w| warnings.push(w.to_string())));
    assert_eq!(warnings, vec![MANIFEST_NOT_FOUND_WARNING.to_string()]);
}

#[test]
fn ok_overwrites_with_new_body() {
    let fixture = handler_with_existing_manifest();
    fixture.handler.handle_body(b"new=2\n").unwrap();
    assert!(fixture.handler.handle_result(ServerStatus::Ok, |_| {}));
    let text = std::fs::read_to_string(fixture.handler.checksum_file()).unwrap();
    assert_eq!(text, "new=2\n");
}

// --- validator ---

#[test]
fn validator_classifies_outcomes() {
    let manifest = ChecksumManifest::parse("foo.jar=abc").unwrap();
    let validator = ChecksumValidator::new(Some(manifest));

    assert_eq!(validator.validate("foo.jar", "abc"), ChecksumOutcome::Match);
    assert_eq!(validator.validate("foo.jar", "ABC"), ChecksumOutcome::Match);
    assert_eq!(validator.validate("bar.jar", "abc"), ChecksumOutcome::EntryMissing);
    assert_eq!(
        validator.validate("foo.jar", "zzz"),
        ChecksumOutcome::Mismatch { expected: "abc".to_string(), actual: "zzz".to_string() }
    );
    assert_eq!(
        ChecksumValidator::new(None).validate("foo.jar", "abc"),
        ChecksumOutcome::ManifestMissing
    );
}

#[test]
fn outcome_messages_name_the_artifact() {
    let missing = ChecksumOutcome::EntryMissing.console_message("s/a.txt").unwrap();
    assert!(missing.contains("[s/a.txt]"));
    assert!(ChecksumOutcome::Match.console_message("x").is_none());
    assert!(!ChecksumOutcome::Mismatch { expected: "a".into(), actual: "b".into() }.is_acceptable());
    assert!(ChecksumOutcome::EntryMissing.is_acceptable());
}

#[test]
fn validator_load_propagates_malformed_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("m");
    std::fs::write(&path, "no separator here").unwrap();
    assert!(ChecksumValidator::load(&path).is_err());
    assert!(!ChecksumValidator::load(&dir.path().join("absent")).unwrap().has_manifest());
}
