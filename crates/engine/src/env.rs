// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::path::{Path, PathBuf};

/// Default name of the checksum manifest file.
pub const DEFAULT_CHECKSUM_FILE: &str = "md5.checksum";

/// Default replacement for registered secrets in console output.
pub const DEFAULT_SECRET_MASK: &str = "******";

/// Artifact-relative directory the publishing manifest is uploaded to.
pub const CHECKSUM_DEST: &str = "relay-output";

/// Checksum manifest file name: RELAY_CHECKSUM_FILE > `md5.checksum`
pub fn checksum_file() -> String {
    std::env::var("RELAY_CHECKSUM_FILE")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CHECKSUM_FILE.to_string())
}

/// Local scratch directory for artifact bookkeeping:
/// RELAY_ARTIFACTS_DIR > `<working_dir>/.relay/artifacts`
pub fn artifacts_dir(working_dir: &Path) -> PathBuf {
    match std::env::var("RELAY_ARTIFACTS_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => working_dir.join(".relay").join("artifacts"),
    }
}

/// Secret mask: RELAY_SECRET_MASK > `******`
pub fn secret_mask() -> String {
    std::env::var("RELAY_SECRET_MASK")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SECRET_MASK.to_string())
}
