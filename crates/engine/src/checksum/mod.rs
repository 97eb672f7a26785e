// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact integrity: checksum manifests, the manifest fetch decision
//! table, and digest validation.

mod handler;
mod manifest;
mod validator;

pub use handler::{ChecksumFileHandler, MANIFEST_NOT_FOUND_WARNING};
pub use manifest::{digest_for, ChecksumManifest};
pub use validator::{ChecksumOutcome, ChecksumValidator};

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChecksumError {
    /// The manifest exists but cannot be parsed.
    #[error("malformed checksum manifest at line {line}: {content:?}")]
    Malformed { line: usize, content: String },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ChecksumError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ChecksumError::Io { path: path.to_path_buf(), source }
    }
}

/// Lowercase hex SHA-256 of a byte slice.
pub fn digest_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Lowercase hex SHA-256 of a file, streamed.
pub fn digest_file(path: &Path) -> Result<String, ChecksumError> {
    let mut file = std::fs::File::open(path).map_err(|e| ChecksumError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| ChecksumError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
#[path = "checksum_tests.rs"]
mod tests;
