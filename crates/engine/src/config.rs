// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use relay_core::JobId;

use crate::env;

/// Per-job settings for a [`crate::BuildSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub job_id: JobId,
    /// Root that relative paths in commands resolve against.
    pub working_dir: PathBuf,
    /// Scratch directory for the publishing checksum manifest.
    pub artifacts_dir: PathBuf,
    pub checksum_file: String,
    pub secret_mask: String,
    /// Values for `${name}` placeholders in echo lines.
    pub variables: HashMap<String, String>,
    /// Environment exported to every process the job spawns.
    pub env: BTreeMap<String, String>,
}

impl SessionConfig {
    /// Config with defaults resolved from the process environment.
    pub fn new(job_id: impl Into<JobId>, working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            job_id: job_id.into(),
            artifacts_dir: env::artifacts_dir(&working_dir),
            working_dir,
            checksum_file: env::checksum_file(),
            secret_mask: env::secret_mask(),
            variables: HashMap::new(),
            env: BTreeMap::new(),
        }
    }

    relay_core::setters! {
        into {
            artifacts_dir: PathBuf,
            checksum_file: String,
            secret_mask: String,
        }
        set {
            variables: HashMap<String, String>,
            env: BTreeMap<String, String>,
        }
    }

    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}
