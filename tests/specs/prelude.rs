// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the behavioral specs.

#![allow(dead_code, unused_imports)]

use std::path::PathBuf;
use std::sync::Once;

pub use relay_adapters::{
    ArtifactFetcher, ArtifactUploader, ChannelStatusReporter, ConsoleSink, DirectoryFetcher,
    DirectoryUploader, FakeConsole, FakeStatusReporter, FileConsole, StatusReport,
    StatusReporter,
};
pub use relay_core::{BuildCommand, JobResult, JobState, RunIf};
pub use relay_engine::{BuildSession, ChecksumManifest, SessionConfig, SessionDeps};
pub use similar_asserts::assert_eq;

pub const JOB_ID: &str = "job-spec";

/// Where the published checksum manifest ends up in the store.
pub const MANIFEST_URL: &str = "relay-output/md5.checksum";

pub type StoreSession<R, C> = BuildSession<R, C, DirectoryUploader, DirectoryFetcher>;

/// An agent workspace plus the artifact store it publishes to.
pub struct Agent {
    pub workspace: tempfile::TempDir,
    pub store: tempfile::TempDir,
    pub scratch: tempfile::TempDir,
}

/// Route engine diagnostics to stderr, filtered by `RUST_LOG`.
fn init_logging() {
    static LOGGING: Once = Once::new();
    LOGGING.call_once(|| {
        // Another harness may already own the global subscriber.
        let _ = relay_engine::logging::init();
    });
}

impl Agent {
    pub fn new() -> Self {
        init_logging();
        Self {
            workspace: tempfile::tempdir().unwrap(),
            store: tempfile::tempdir().unwrap(),
            scratch: tempfile::tempdir().unwrap(),
        }
    }

    /// Create a file in the workspace.
    pub fn file(&self, relative: &str, content: &str) -> &Self {
        let path = self.workspace_path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        self
    }

    pub fn workspace_path(&self, relative: &str) -> PathBuf {
        self.workspace.path().join(relative)
    }

    pub fn store_path(&self, relative: &str) -> PathBuf {
        self.store.path().join(relative)
    }

    pub fn config(&self) -> SessionConfig {
        SessionConfig::new(JOB_ID, self.workspace.path())
            .artifacts_dir(self.scratch.path())
            .checksum_file("md5.checksum")
            .secret_mask("******")
    }

    pub fn session<R, C>(&self, reporter: R, console: C) -> StoreSession<R, C>
    where
        R: StatusReporter,
        C: ConsoleSink,
    {
        BuildSession::new(
            self.config(),
            SessionDeps {
                reporter,
                console,
                uploader: DirectoryUploader::new(self.store.path()),
                fetcher: DirectoryFetcher::new(self.store.path()),
            },
        )
    }

    /// Session wired to recording fakes for reporter and console.
    pub fn fake_session(&self) -> (StoreSession<FakeStatusReporter, FakeConsole>, FakeStatusReporter, FakeConsole) {
        let reporter = FakeStatusReporter::new();
        let console = FakeConsole::new();
        (self.session(reporter.clone(), console.clone()), reporter, console)
    }

    pub fn published_manifest(&self) -> ChecksumManifest {
        let path = self.store_path(MANIFEST_URL);
        ChecksumManifest::load(&path).unwrap().expect("manifest should be published")
    }
}

/// Ship `tree` through a framed stream, as the server would, then build it.
pub async fn build_over_wire<R, C>(session: &StoreSession<R, C>, tree: &BuildCommand) -> JobResult
where
    R: StatusReporter,
    C: ConsoleSink,
{
    let (mut server, mut agent) = tokio::io::duplex(64 * 1024);
    relay_wire::write_command(&mut server, tree).await.unwrap();
    let received = relay_wire::read_command(&mut agent).await.unwrap();
    assert_eq!(received.dump(), tree.dump());
    session.build(&received).await
}
