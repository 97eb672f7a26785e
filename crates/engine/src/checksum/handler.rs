// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use relay_adapters::ServerStatus;

use super::ChecksumError;

pub const MANIFEST_NOT_FOUND_WARNING: &str =
    "[WARN] Checksum manifest not found, integrity not verified. The artifacts will be saved without verifying the integrity of their contents.";

/// Owns the local copy of a checksum manifest fetched from the server.
#[derive(Debug, Clone)]
pub struct ChecksumFileHandler {
    checksum_file: PathBuf,
}

impl ChecksumFileHandler {
    pub fn new(checksum_file: impl Into<PathBuf>) -> Self {
        Self { checksum_file: checksum_file.into() }
    }

    pub fn checksum_file(&self) -> &Path {
        &self.checksum_file
    }

    /// Store a manifest body received with an OK response.
    pub fn handle_body(&self, body: &[u8]) -> Result<(), ChecksumError> {
        if let Some(parent) = self.checksum_file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ChecksumError::io(parent, e))?;
        }
        std::fs::write(&self.checksum_file, body)
            .map_err(|e| ChecksumError::io(&self.checksum_file, e))
    }

    /// Apply the response status to local state. Returns whether the caller
    /// may proceed.
    ///
    /// | status       | local manifest        | result |
    /// |--------------|-----------------------|--------|
    /// | OK           | kept (as stored)      | true   |
    /// | NOT_MODIFIED | kept                  | true   |
    /// | NOT_FOUND    | deleted, warning      | true   |
    /// | anything else| untouched             | false  |
    pub fn handle_result(&self, status: ServerStatus, mut warn: impl FnMut(&str)) -> bool {
        match status {
            ServerStatus::Ok | ServerStatus::NotModified => true,
            ServerStatus::NotFound => {
                if let Err(e) = std::fs::remove_file(&self.checksum_file) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            path = %self.checksum_file.display(),
                            error = %e,
                            "failed to delete stale checksum manifest"
                        );
                    }
                }
                warn(MANIFEST_NOT_FOUND_WARNING);
                true
            }
            ServerStatus::Forbidden | ServerStatus::Other(_) => {
                tracing::warn!(%status, "checksum manifest fetch refused");
                false
            }
        }
    }
}
