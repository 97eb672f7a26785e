// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use relay_adapters::{FakeConsole, FakeFetcher, FakeStatusReporter, FakeUploader};
use std::path::PathBuf;
use tempfile::TempDir;

mod artifacts;
mod cancel;
mod console;
mod flow;
mod fs;
mod properties;

pub(super) type FakeSession = BuildSession<FakeStatusReporter, FakeConsole, FakeUploader, FakeFetcher>;

pub(super) struct Harness {
    pub dir: TempDir,
    pub scratch: TempDir,
    pub session: FakeSession,
    pub reporter: FakeStatusReporter,
    pub console: FakeConsole,
    pub uploader: FakeUploader,
    pub fetcher: FakeFetcher,
}

pub(super) fn harness() -> Harness {
    harness_with(|config| config)
}

pub(super) fn harness_with(configure: impl FnOnce(SessionConfig) -> SessionConfig) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let config = SessionConfig::new("job-test", dir.path())
        .artifacts_dir(scratch.path())
        .checksum_file("md5.checksum")
        .secret_mask("******");

    let reporter = FakeStatusReporter::new();
    let console = FakeConsole::new();
    let uploader = FakeUploader::new();
    let fetcher = FakeFetcher::new();
    let deps = SessionDeps {
        reporter: reporter.clone(),
        console: console.clone(),
        uploader: uploader.clone(),
        fetcher: fetcher.clone(),
    };
    let session = BuildSession::new(configure(config), deps);
    Harness { dir, scratch, session, reporter, console, uploader, fetcher }
}

impl Harness {
    pub async fn run(&self, command: BuildCommand) -> JobResult {
        self.session.build(&command).await
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn lines(&self) -> Vec<String> {
        self.console.lines()
    }
}
