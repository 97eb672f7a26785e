// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact fetch specs
//!
//! Verify a downstream job fetches what an upstream job published and
//! checks it against the published manifest.

use crate::prelude::*;
use crate::prelude::assert_eq;

async fn publish(agent: &Agent) {
    agent.file("target/app.jar", "release bytes");
    let (session, _reporter, _console) = agent.fake_session();
    let result =
        build_over_wire(&session, &BuildCommand::upload_artifact("target/app.jar", "dist")).await;
    assert_eq!(result, JobResult::Passed);
}

fn fetch_app(checksum_url: Option<&str>) -> BuildCommand {
    BuildCommand::download_file("dist/app.jar", "deps/app.jar", "dist/app.jar", checksum_url)
}

#[tokio::test]
async fn published_artifact_is_fetched_and_verified() {
    let agent = Agent::new();
    publish(&agent).await;
    let (session, _reporter, console) = agent.fake_session();

    let result = build_over_wire(&session, &fetch_app(Some(MANIFEST_URL))).await;

    assert_eq!(result, JobResult::Passed);
    assert_eq!(
        std::fs::read_to_string(agent.workspace_path("deps/app.jar")).unwrap(),
        "release bytes"
    );
    assert!(console.contains("after verifying the integrity of its contents."));
}

#[tokio::test]
async fn tampered_artifact_is_rejected() {
    let agent = Agent::new();
    publish(&agent).await;
    std::fs::write(agent.store_path("dist/app.jar"), "tampered").unwrap();
    let (session, reporter, console) = agent.fake_session();

    let tree = BuildCommand::compose([
        fetch_app(Some(MANIFEST_URL)),
        BuildCommand::echo(&["using dependency"]),
    ]);
    let result = build_over_wire(&session, &tree).await;

    assert_eq!(result, JobResult::Failed);
    assert!(!agent.workspace_path("deps/app.jar").exists());
    assert!(console.contains("[ERROR] Verification of the integrity of the artifact [dist/app.jar] failed"));
    assert!(!console.contains("using dependency"));
    assert_eq!(reporter.completed_result(), Some(JobResult::Failed));
}

#[tokio::test]
async fn missing_manifest_degrades_to_unverified_fetch() {
    let agent = Agent::new();
    publish(&agent).await;
    std::fs::remove_file(agent.store_path(MANIFEST_URL)).unwrap();
    let (session, _reporter, console) = agent.fake_session();

    let result = build_over_wire(&session, &fetch_app(Some(MANIFEST_URL))).await;

    assert_eq!(result, JobResult::Passed);
    assert!(console.contains("without verifying the integrity of its contents."));
}

#[tokio::test]
async fn missing_artifact_fails() {
    let agent = Agent::new();
    let (session, _reporter, console) = agent.fake_session();

    let result = build_over_wire(&session, &fetch_app(None)).await;

    assert_eq!(result, JobResult::Failed);
    assert!(console.contains("Could not fetch artifact dist/app.jar"));
}

#[tokio::test]
async fn unchanged_artifact_is_not_downloaded_again() {
    let agent = Agent::new();
    publish(&agent).await;
    let (session, _reporter, _console) = agent.fake_session();
    let first = build_over_wire(&session, &fetch_app(Some(MANIFEST_URL))).await;
    assert_eq!(first, JobResult::Passed);

    let (session, _reporter, console) = agent.fake_session();
    let second = build_over_wire(&session, &fetch_app(Some(MANIFEST_URL))).await;

    assert_eq!(second, JobResult::Passed);
    assert!(console.contains("is unchanged on the server, keeping the local copy."));
    assert_eq!(
        std::fs::read_to_string(agent.workspace_path("deps/app.jar")).unwrap(),
        "release bytes"
    );
}

#[tokio::test]
async fn changed_artifact_replaces_local_copy() {
    let agent = Agent::new();
    publish(&agent).await;
    agent.file("deps/app.jar", "stale bytes");
    let (session, _reporter, console) = agent.fake_session();

    let result = build_over_wire(&session, &fetch_app(Some(MANIFEST_URL))).await;

    assert_eq!(result, JobResult::Passed);
    assert!(console.contains("after verifying the integrity of its contents."));
    assert_eq!(
        std::fs::read_to_string(agent.workspace_path("deps/app.jar")).unwrap(),
        "release bytes"
    );
}
