// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolving an upload rule (`src` pattern + `dest`) to concrete files.
//!
//! Each matched file lands at `dest/<its directory relative to the rule
//! base>`. The base of a glob is the path before its first wildcard segment;
//! the base of a plain directory is its parent, so the directory keeps its
//! own name under `dest`.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid pattern [{pattern}]: {message}")]
    Pattern { pattern: String, message: String },
}

/// One file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    pub file: PathBuf,
    /// Artifact-relative destination directory.
    pub dest: String,
}

impl PlannedUpload {
    /// Artifact-relative path of the uploaded file, used as manifest key.
    pub fn artifact_path(&self) -> String {
        let name = self.file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        join_dest(&self.dest, &name)
    }
}

fn is_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}

/// `a` + `b` with `/`, skipping empty sides.
fn join_dest(a: &str, b: &str) -> String {
    let a = a.trim_matches('/');
    let b = b.trim_matches('/');
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{a}/{b}"),
    }
}

/// Relative path rendered with forward slashes.
fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// The literal directory prefix of a glob pattern.
fn glob_base(pattern: &str) -> String {
    pattern
        .split('/')
        .take_while(|segment| !is_wildcard(segment))
        .collect::<Vec<_>>()
        .join("/")
}

/// Files under `path` (itself if a file), sorted.
fn files_under(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

fn plan_for(files: Vec<PathBuf>, base: &Path, dest: &str) -> Vec<PlannedUpload> {
    files
        .into_iter()
        .map(|file| {
            let parent = file.parent().unwrap_or(base);
            let relative = parent.strip_prefix(base).map(slash_path).unwrap_or_default();
            PlannedUpload { dest: join_dest(dest, &relative), file }
        })
        .collect()
}

/// Resolve `src` against `working_dir`. An empty result means the rule
/// matched nothing.
pub fn plan_uploads(
    working_dir: &Path,
    src: &str,
    dest: &str,
) -> Result<Vec<PlannedUpload>, PublishError> {
    let src = src.trim().replace('\\', "/");
    let dest = dest.trim();

    if !src.split('/').any(is_wildcard) {
        let path = working_dir.join(&src);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let base = path.parent().map(Path::to_path_buf).unwrap_or_else(|| working_dir.to_path_buf());
        return Ok(plan_for(files_under(&path), &base, dest));
    }

    let base = working_dir.join(glob_base(&src));
    let full_pattern = working_dir.join(&src).to_string_lossy().into_owned();
    let paths = glob::glob(&full_pattern).map_err(|e| PublishError::Pattern {
        pattern: src.clone(),
        message: e.msg.to_string(),
    })?;

    let mut files: Vec<PathBuf> = paths
        // Skip paths that had errors (e.g., permission denied)
        .filter_map(Result::ok)
        .flat_map(|path| files_under(&path))
        .collect();
    files.sort();
    files.dedup();
    Ok(plan_for(files, &base, dest))
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
