// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::checksum::{digest_bytes, ChecksumManifest, MANIFEST_NOT_FOUND_WARNING};
use relay_adapters::{conditional_url, Fetched, ServerStatus};
use std::io::Write;

const CHECKSUM_URL: &str = "http://server/files/md5.checksum";
const ARTIFACT_URL: &str = "http://server/files/pkg/app.jar";

fn published_manifest(h: &Harness) -> Option<ChecksumManifest> {
    ChecksumManifest::load(&h.scratch.path().join("md5.checksum")).unwrap()
}

fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(*name, zip::write::FileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn download(checksum_url: Option<&str>) -> BuildCommand {
    BuildCommand::download_file(ARTIFACT_URL, "deps/app.jar", "pkg/app.jar", checksum_url)
}

// --- upload ---

#[tokio::test]
async fn upload_publishes_files_and_manifest() {
    let h = harness();
    h.write("logs/pic/x.png", "x-bytes");
    h.write("y.png", "y-bytes");

    let result = h.run(BuildCommand::upload_artifact("**/*.png", "mypic")).await;

    assert_eq!(result, JobResult::Passed);
    assert_eq!(
        h.uploader.uploaded(),
        vec![
            ("md5.checksum".to_string(), "relay-output".to_string()),
            ("x.png".to_string(), "mypic/logs/pic".to_string()),
            ("y.png".to_string(), "mypic".to_string()),
        ]
    );
    let manifest = published_manifest(&h).unwrap();
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.get("mypic/logs/pic/x.png"), Some(digest_bytes(b"x-bytes").as_str()));
    assert_eq!(manifest.get("mypic/y.png"), Some(digest_bytes(b"y-bytes").as_str()));
}

#[tokio::test]
async fn upload_with_no_match_warns_without_failing() {
    let h = harness();
    let result = h.run(BuildCommand::upload_artifact("nothing/*.zip", "dist")).await;

    assert_eq!(result, JobResult::Passed);
    let expected = format!(
        "[WARN] The rule [nothing/*.zip] cannot match any resource under [{}]",
        h.dir.path().display()
    );
    assert_eq!(h.lines(), vec![expected]);
    assert!(h.uploader.calls().is_empty());
}

#[tokio::test]
async fn failed_upload_records_no_checksums() {
    let h = harness();
    h.write("a/good.txt", "good");
    h.write("a/bad.txt", "bad");
    h.uploader.fail_on("bad");

    let result = h.run(BuildCommand::upload_artifact("a/*.txt", "out")).await;

    assert_eq!(result, JobResult::Failed);
    assert!(h.console.contains("Failed to upload [a/*.txt]"));
    assert_eq!(published_manifest(&h), None);
    assert!(h.uploader.uploaded().iter().all(|(name, _)| name != "md5.checksum"));
}

#[tokio::test]
async fn failed_manifest_upload_leaves_published_checksums_untouched() {
    let h = harness();
    h.write("first/a.txt", "a");
    h.write("second/b.txt", "b");
    h.uploader.fail_once_on("md5");

    let result = h
        .run(BuildCommand::compose([
            BuildCommand::upload_artifact("first/a.txt", "out"),
            BuildCommand::upload_artifact("second/b.txt", "out").run_if(relay_core::RunIf::Any),
        ]))
        .await;

    assert_eq!(result, JobResult::Failed);
    assert!(h.console.contains("Failed to upload [md5.checksum]"));
    let manifest = published_manifest(&h).unwrap();
    let keys: Vec<&str> = manifest.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["out/b.txt"]);
}

#[tokio::test]
async fn failed_manifest_upload_restores_previous_manifest_on_disk() {
    let h = harness();
    h.write("first/a.txt", "a");
    h.uploader.fail_on("md5");

    let result = h.run(BuildCommand::upload_artifact("first/a.txt", "out")).await;

    assert_eq!(result, JobResult::Failed);
    assert_eq!(published_manifest(&h), None);
}

#[tokio::test]
async fn manifest_accumulates_across_rules_and_skips_failed_ones() {
    let h = harness();
    h.write("build/app.jar", "app");
    h.write("docs/readme.txt", "docs");
    h.write("broken/bad.bin", "bad");
    h.uploader.fail_on("bad");

    let result = h
        .run(BuildCommand::compose([
            BuildCommand::upload_artifact("build/app.jar", "pkg"),
            BuildCommand::upload_artifact("docs", ""),
            BuildCommand::upload_artifact("broken/*", "x").run_if(relay_core::RunIf::Any),
        ]))
        .await;

    assert_eq!(result, JobResult::Failed);
    let manifest = published_manifest(&h).unwrap();
    let keys: Vec<&str> = manifest.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["docs/readme.txt", "pkg/app.jar"]);
}

// --- download ---

#[tokio::test]
async fn download_verifies_against_manifest() {
    let h = harness();
    h.fetcher.respond(
        CHECKSUM_URL,
        Fetched::ok(format!("pkg/app.jar={}\n", digest_bytes(b"jar bytes"))),
    );
    h.fetcher.respond(ARTIFACT_URL, Fetched::ok("jar bytes"));

    let result = h.run(download(Some(CHECKSUM_URL))).await;

    assert_eq!(result, JobResult::Passed);
    assert_eq!(std::fs::read_to_string(h.path("deps/app.jar")).unwrap(), "jar bytes");
    let expected = format!(
        "Saved artifact to [{}] after verifying the integrity of its contents.",
        h.path("deps/app.jar").display()
    );
    assert_eq!(h.lines(), vec![expected]);
}

#[tokio::test]
async fn download_mismatch_fails_and_discards_file() {
    let h = harness();
    h.fetcher.respond(
        CHECKSUM_URL,
        Fetched::ok(format!("pkg/app.jar={}\n", digest_bytes(b"original"))),
    );
    h.fetcher.respond(ARTIFACT_URL, Fetched::ok("tampered"));

    let result = h.run(download(Some(CHECKSUM_URL))).await;

    assert_eq!(result, JobResult::Failed);
    assert!(!h.path("deps/app.jar").exists());
    let lines = h.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("[ERROR] Verification of the integrity of the artifact [pkg/app.jar] failed"));
}

#[tokio::test]
async fn download_without_entry_warns_and_keeps_file() {
    let h = harness();
    h.fetcher.respond(CHECKSUM_URL, Fetched::ok("other/file=abc\n"));
    h.fetcher.respond(ARTIFACT_URL, Fetched::ok("jar bytes"));

    let result = h.run(download(Some(CHECKSUM_URL))).await;

    assert_eq!(result, JobResult::Passed);
    assert!(h.path("deps/app.jar").is_file());
    assert!(h.console.contains("[WARN] The checksum of the artifact [pkg/app.jar] was not found"));
    assert!(h.console.contains("without verifying the integrity of its contents."));
}

#[tokio::test]
async fn download_with_manifest_not_found_proceeds_unverified() {
    let h = harness();
    h.fetcher.respond(CHECKSUM_URL, Fetched::status(ServerStatus::NotFound));
    h.fetcher.respond(ARTIFACT_URL, Fetched::ok("jar bytes"));

    let result = h.run(download(Some(CHECKSUM_URL))).await;

    assert_eq!(result, JobResult::Passed);
    let lines = h.lines();
    assert_eq!(lines[0], MANIFEST_NOT_FOUND_WARNING);
    assert!(lines[1].ends_with("without verifying the integrity of its contents."));
}

#[tokio::test]
async fn download_with_manifest_refused_does_not_fetch_artifact() {
    let h = harness();
    h.fetcher.respond(CHECKSUM_URL, Fetched::status(ServerStatus::Forbidden));
    h.fetcher.respond(ARTIFACT_URL, Fetched::ok("jar bytes"));

    let result = h.run(download(Some(CHECKSUM_URL))).await;

    assert_eq!(result, JobResult::Failed);
    assert_eq!(h.fetcher.calls(), vec![CHECKSUM_URL.to_string()]);
    assert!(!h.path("deps/app.jar").exists());
}

#[tokio::test]
async fn not_modified_reuses_previous_manifest() {
    let h = harness();
    h.fetcher.respond(
        CHECKSUM_URL,
        Fetched::ok(format!("pkg/app.jar={}\n", digest_bytes(b"jar bytes"))),
    );
    h.fetcher.respond(ARTIFACT_URL, Fetched::ok("jar bytes"));
    assert_eq!(h.run(download(Some(CHECKSUM_URL))).await, JobResult::Passed);

    h.console.clear();
    std::fs::remove_file(h.path("deps/app.jar")).unwrap();
    h.fetcher.respond(CHECKSUM_URL, Fetched::status(ServerStatus::NotModified));
    assert_eq!(h.run(download(Some(CHECKSUM_URL))).await, JobResult::Passed);
    assert!(h.console.contains("after verifying the integrity"));
}

#[tokio::test]
async fn not_modified_manifest_is_kept_per_source() {
    const OTHER_CHECKSUM_URL: &str = "http://other/files/md5.checksum";
    const OTHER_ARTIFACT_URL: &str = "http://other/files/pkg/app.jar";
    let h = harness();
    h.fetcher.respond(
        CHECKSUM_URL,
        Fetched::ok(format!("pkg/app.jar={}\n", digest_bytes(b"first bytes"))),
    );
    h.fetcher.respond(ARTIFACT_URL, Fetched::ok("first bytes"));
    h.fetcher.respond(OTHER_CHECKSUM_URL, Fetched::status(ServerStatus::NotModified));
    h.fetcher.respond(OTHER_ARTIFACT_URL, Fetched::ok("second bytes"));

    let result = h
        .run(BuildCommand::compose([
            download(Some(CHECKSUM_URL)),
            BuildCommand::download_file(OTHER_ARTIFACT_URL, "other/app.jar", "pkg/app.jar", Some(OTHER_CHECKSUM_URL)),
        ]))
        .await;

    assert_eq!(result, JobResult::Passed);
    assert_eq!(std::fs::read_to_string(h.path("other/app.jar")).unwrap(), "second bytes");
    assert!(!h.console.contains("[ERROR]"));
    let last = h.console.last_line().unwrap();
    assert!(last.ends_with("without verifying the integrity of its contents."));
}

#[tokio::test]
async fn existing_destination_is_fetched_conditionally() {
    let h = harness();
    h.write("deps/app.jar", "old bytes");
    let conditional = conditional_url(ARTIFACT_URL, &digest_bytes(b"old bytes"));
    h.fetcher.respond(ARTIFACT_URL, Fetched::ok("content without digest"));
    h.fetcher.respond(&conditional, Fetched::ok("content with digest"));

    let result = h.run(download(None)).await;

    assert_eq!(result, JobResult::Passed);
    assert_eq!(h.fetcher.calls(), vec![conditional]);
    assert_eq!(std::fs::read_to_string(h.path("deps/app.jar")).unwrap(), "content with digest");
    assert!(h.console.contains("Saved artifact"));
}

#[tokio::test]
async fn not_modified_artifact_keeps_local_copy() {
    let h = harness();
    h.write("deps/app.jar", "jar bytes");
    h.fetcher.respond(
        CHECKSUM_URL,
        Fetched::ok(format!("pkg/app.jar={}\n", digest_bytes(b"jar bytes"))),
    );
    h.fetcher.respond(
        &conditional_url(ARTIFACT_URL, &digest_bytes(b"jar bytes")),
        Fetched::status(ServerStatus::NotModified),
    );

    let result = h.run(download(Some(CHECKSUM_URL))).await;

    assert_eq!(result, JobResult::Passed);
    assert_eq!(std::fs::read_to_string(h.path("deps/app.jar")).unwrap(), "jar bytes");
    let expected = format!(
        "[relay] Artifact [{}] is unchanged on the server, keeping the local copy.",
        h.path("deps/app.jar").display()
    );
    assert_eq!(h.lines(), vec![expected]);
}

#[tokio::test]
async fn not_modified_artifact_is_still_verified() {
    let h = harness();
    h.write("deps/app.jar", "local edit");
    h.fetcher.respond(
        CHECKSUM_URL,
        Fetched::ok(format!("pkg/app.jar={}\n", digest_bytes(b"jar bytes"))),
    );
    h.fetcher.respond(
        &conditional_url(ARTIFACT_URL, &digest_bytes(b"local edit")),
        Fetched::status(ServerStatus::NotModified),
    );

    assert_eq!(h.run(download(Some(CHECKSUM_URL))).await, JobResult::Failed);
    assert!(h.console.contains("[ERROR] Verification of the integrity of the artifact [pkg/app.jar] failed"));
}

#[tokio::test]
async fn download_without_checksum_url_is_unverified() {
    let h = harness();
    h.fetcher.respond(ARTIFACT_URL, Fetched::ok("jar bytes"));

    let result = h.run(download(None)).await;

    assert_eq!(result, JobResult::Passed);
    assert_eq!(h.fetcher.calls(), vec![ARTIFACT_URL.to_string()]);
    assert_eq!(h.lines().len(), 1);
    assert!(h.console.contains("without verifying the integrity of its contents."));
}

#[tokio::test]
async fn download_failures_fail_the_node() {
    let h = harness();
    h.fetcher.respond(ARTIFACT_URL, Fetched::status(ServerStatus::NotFound));
    assert_eq!(h.run(download(None)).await, JobResult::Failed);
    assert!(h.console.contains(&format!(
        "Could not fetch artifact {ARTIFACT_URL}. Server responded with status 404"
    )));

    let unreachable = harness();
    assert_eq!(unreachable.run(download(None)).await, JobResult::Failed);
}

#[tokio::test]
async fn malformed_manifest_fails_download() {
    let h = harness();
    h.fetcher.respond(CHECKSUM_URL, Fetched::ok("not a manifest"));
    h.fetcher.respond(ARTIFACT_URL, Fetched::ok("jar bytes"));

    assert_eq!(h.run(download(Some(CHECKSUM_URL))).await, JobResult::Failed);
    assert!(!h.path("deps/app.jar").exists());
}

// --- download dir ---

const DIR_URL: &str = "http://server/files/log.zip";
const DIR_CHECKSUM_URL: &str = "http://server/files/log.zip.checksum";

fn download_dir() -> BuildCommand {
    BuildCommand::download_dir(DIR_URL, "dest", "s/log", Some(DIR_CHECKSUM_URL))
}

#[tokio::test]
async fn download_dir_unpacks_verified_entries() {
    let h = harness();
    h.fetcher.respond(DIR_URL, Fetched::ok(zip_of(&[("log/a", "content for a"), ("log/b", "content for b")])));
    h.fetcher.respond(
        DIR_CHECKSUM_URL,
        Fetched::ok(format!(
            "s/log/a={}\ns/log/b={}\n",
            digest_bytes(b"content for a"),
            digest_bytes(b"content for b")
        )),
    );

    let result = h.run(download_dir()).await;

    assert_eq!(result, JobResult::Passed);
    assert_eq!(std::fs::read_to_string(h.path("dest/log/a")).unwrap(), "content for a");
    assert_eq!(std::fs::read_to_string(h.path("dest/log/b")).unwrap(), "content for b");
    let expected = format!(
        "Saved artifact to [{}] after verifying the integrity of its contents.",
        h.path("dest").display()
    );
    assert_eq!(h.lines(), vec![expected]);
}

#[tokio::test]
async fn download_dir_mismatch_writes_nothing() {
    let h = harness();
    h.fetcher.respond(DIR_URL, Fetched::ok(zip_of(&[("log/a", "content for a"), ("log/b", "tampered")])));
    h.fetcher.respond(
        DIR_CHECKSUM_URL,
        Fetched::ok(format!(
            "s/log/a={}\ns/log/b={}\n",
            digest_bytes(b"content for a"),
            digest_bytes(b"content for b")
        )),
    );

    assert_eq!(h.run(download_dir()).await, JobResult::Failed);
    assert!(!h.path("dest").exists());
    assert!(h.console.contains("[ERROR] Verification of the integrity of the artifact [s/log/b] failed"));
}

#[tokio::test]
async fn download_dir_warns_for_entries_missing_from_manifest() {
    let h = harness();
    h.fetcher.respond(DIR_URL, Fetched::ok(zip_of(&[("log/a", "content for a"), ("log/new", "fresh")])));
    h.fetcher.respond(
        DIR_CHECKSUM_URL,
        Fetched::ok(format!("s/log/a={}\n", digest_bytes(b"content for a"))),
    );

    assert_eq!(h.run(download_dir()).await, JobResult::Passed);
    assert!(h.path("dest/log/new").is_file());
    assert!(h.console.contains("[WARN] The checksum of the artifact [s/log/new] was not found"));
    assert!(h.console.last_line().unwrap().ends_with("without verifying the integrity of its contents."));
}

#[tokio::test]
async fn download_dir_rejects_non_archive_body() {
    let h = harness();
    h.fetcher.respond(DIR_URL, Fetched::ok("not a zip"));

    let result = h.run(BuildCommand::download_dir(DIR_URL, "dest", "s/log", None)).await;

    assert_eq!(result, JobResult::Failed);
    assert!(h.console.contains(&format!("Could not unpack artifact {DIR_URL}")));
}
