// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;
use std::path::Path;

use super::ChecksumError;

/// Artifact-relative path to digest.
///
/// Text form is one `path=digest` per line; `#` and `!` start comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: BTreeMap<String, String>,
}

/// Canonical key: forward slashes, no leading `./` or `/`.
fn normalize_key(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let mut key = unified.as_str();
    loop {
        if let Some(rest) = key.strip_prefix("./") {
            key = rest;
        } else if let Some(rest) = key.strip_prefix('/') {
            key = rest;
        } else {
            break;
        }
    }
    key.to_string()
}

impl ChecksumManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, ChecksumError> {
        let mut manifest = Self::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let malformed = || ChecksumError::Malformed { line: index + 1, content: raw.to_string() };
            let (key, digest) = line.split_once('=').ok_or_else(malformed)?;
            let key = normalize_key(key);
            if key.is_empty() {
                return Err(malformed());
            }
            manifest.entries.insert(key, digest.trim().to_string());
        }
        Ok(manifest)
    }

    /// Load from disk. A missing file is `Ok(None)`, not an error.
    pub fn load(path: &Path) -> Result<Option<Self>, ChecksumError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChecksumError::io(path, e)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(&normalize_key(path)).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize_key(path))
    }

    pub fn insert(&mut self, path: &str, digest: impl Into<String>) {
        self.entries.insert(normalize_key(path), digest.into());
    }

    /// Merge `other` in; its entries win.
    pub fn extend(&mut self, other: ChecksumManifest) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sorted `path=digest` lines with a trailing newline.
    pub fn render(&self) -> String {
        self.entries.iter().map(|(k, v)| format!("{k}={v}\n")).collect()
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ChecksumError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ChecksumError::io(parent, e))?;
        }
        std::fs::write(path, self.render()).map_err(|e| ChecksumError::io(path, e))
    }
}

/// Digest for `path`. `None` both without a manifest and without an entry;
/// callers that care check `manifest.is_some()` first.
pub fn digest_for<'a>(manifest: Option<&'a ChecksumManifest>, path: &str) -> Option<&'a str> {
    manifest.and_then(|m| m.get(path))
}
