// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State threaded through one tree walk.

use std::collections::BTreeMap;

use relay_core::{JobOutcome, JobResult, JobState};

use crate::checksum::ChecksumManifest;
use crate::config::SessionConfig;
use crate::secrets::SecretMasker;

/// Where console lines of the current scope go.
#[derive(Debug)]
pub(crate) enum Output {
    Console,
    /// Kept in memory and never shown; used for `test` evaluation.
    Capture(Vec<String>),
}

/// Result scope of a subtree.
///
/// The job walk has one; each `test` evaluation gets its own so that its
/// outcome never leaks into the job result.
#[derive(Debug)]
pub(crate) struct Scope {
    pub result: JobResult,
    pub output: Output,
    /// Set while running an `on_cancel` subtree, which must not itself be
    /// short-circuited by the cancellation that started it.
    pub cleanup: bool,
}

impl Scope {
    pub fn console() -> Self {
        Self { result: JobResult::Passed, output: Output::Console, cleanup: false }
    }

    pub fn capture() -> Self {
        Self { result: JobResult::Passed, output: Output::Capture(Vec::new()), cleanup: false }
    }

    pub fn fail(&mut self) {
        self.result = JobResult::Failed;
    }

    pub fn captured(&self) -> String {
        match &self.output {
            Output::Capture(lines) => lines.join("\n"),
            Output::Console => String::new(),
        }
    }
}

/// Mutable state of one job run, owned by the walk.
#[derive(Debug)]
pub(crate) struct RunState {
    /// Variables exported by the job, on top of the configured env.
    pub env: BTreeMap<String, String>,
    pub secrets: SecretMasker,
    /// Checksums of everything published so far.
    pub published: ChecksumManifest,
    pub last_state: Option<JobState>,
    pub completing_reported: bool,
    pub outcome: JobOutcome,
}

impl RunState {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            env: config.env.clone(),
            secrets: SecretMasker::new(),
            published: ChecksumManifest::new(),
            last_state: None,
            completing_reported: false,
            outcome: JobOutcome::new(),
        }
    }
}
