// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact publishing specs
//!
//! Verify upload rules land files in the store with a checksum manifest.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn rules_publish_files_and_manifest() {
    let agent = Agent::new();
    agent
        .file("target/app.jar", "jar")
        .file("logs/pic/shot.png", "png")
        .file("logs/run.log", "log");
    let (session, _reporter, console) = agent.fake_session();

    let tree = BuildCommand::compose([
        BuildCommand::upload_artifact("target/app.jar", "dist"),
        BuildCommand::upload_artifact("**/*.png", "pictures"),
        BuildCommand::upload_artifact("missing/*.zip", "zips"),
    ]);
    let result = build_over_wire(&session, &tree).await;

    assert_eq!(result, JobResult::Passed);
    assert_eq!(std::fs::read_to_string(agent.store_path("dist/app.jar")).unwrap(), "jar");
    assert_eq!(
        std::fs::read_to_string(agent.store_path("pictures/logs/pic/shot.png")).unwrap(),
        "png"
    );
    assert!(!agent.store_path("pictures/logs/run.log").exists());
    assert!(console.contains("[WARN] The rule [missing/*.zip] cannot match any resource"));

    let manifest = agent.published_manifest();
    let keys: Vec<&str> = manifest.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["dist/app.jar", "pictures/logs/pic/shot.png"]);
}

#[tokio::test]
async fn destination_escaping_the_store_fails() {
    let agent = Agent::new();
    agent.file("app.jar", "jar");
    let (session, _reporter, console) = agent.fake_session();

    let result = build_over_wire(&session, &BuildCommand::upload_artifact("app.jar", "../outside")).await;

    assert_eq!(result, JobResult::Failed);
    assert!(console.contains("Failed to upload [app.jar]"));
    assert!(!agent.store_path(MANIFEST_URL).exists());
}
