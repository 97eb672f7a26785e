// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use super::{ChecksumError, ChecksumManifest};

/// Classification of one artifact against the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumOutcome {
    /// No manifest was available at all.
    ManifestMissing,
    /// The manifest has no entry for this artifact.
    EntryMissing,
    Match,
    Mismatch { expected: String, actual: String },
}

impl ChecksumOutcome {
    /// Whether the artifact may be kept.
    pub fn is_acceptable(&self) -> bool {
        !matches!(self, ChecksumOutcome::Mismatch { .. })
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, ChecksumOutcome::Match)
    }

    /// Console line describing the outcome for `path`, if any.
    pub fn console_message(&self, path: &str) -> Option<String> {
        match self {
            ChecksumOutcome::ManifestMissing => Some(
                "[WARN] The checksum manifest was not found on the server. Hence, the integrity of the artifacts could not be verified."
                    .to_string(),
            ),
            ChecksumOutcome::EntryMissing => Some(format!(
                "[WARN] The checksum of the artifact [{path}] was not found on the server. Hence, its integrity could not be verified."
            )),
            ChecksumOutcome::Match => None,
            ChecksumOutcome::Mismatch { .. } => Some(format!(
                "[ERROR] Verification of the integrity of the artifact [{path}] failed. The artifact file on the server may have changed since its original upload."
            )),
        }
    }
}

/// Compares freshly computed digests against a manifest.
#[derive(Debug, Clone, Default)]
pub struct ChecksumValidator {
    manifest: Option<ChecksumManifest>,
}

impl ChecksumValidator {
    pub fn new(manifest: Option<ChecksumManifest>) -> Self {
        Self { manifest }
    }

    /// Load the manifest at `path`; a missing file yields a validator with
    /// no manifest, a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ChecksumError> {
        ChecksumManifest::load(path).map(Self::new)
    }

    pub fn has_manifest(&self) -> bool {
        self.manifest.is_some()
    }

    pub fn validate(&self, path: &str, actual: &str) -> ChecksumOutcome {
        let Some(manifest) = &self.manifest else {
            return ChecksumOutcome::ManifestMissing;
        };
        match manifest.get(path) {
            None => ChecksumOutcome::EntryMissing,
            Some(expected) if expected.eq_ignore_ascii_case(actual) => ChecksumOutcome::Match,
            Some(expected) => {
                ChecksumOutcome::Mismatch { expected: expected.to_string(), actual: actual.to_string() }
            }
        }
    }
}
