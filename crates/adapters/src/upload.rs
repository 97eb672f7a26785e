// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from artifact upload
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid destination {0:?}")]
    InvalidDestination(String),
    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Publishes one artifact file to the server.
///
/// The session never retries; retrying is the implementation's business.
#[async_trait]
pub trait ArtifactUploader: Clone + Send + Sync + 'static {
    /// Upload `file` under the artifact-relative directory `dest`.
    async fn upload(&self, file: &Path, dest: &str) -> Result<(), UploadError>;
}

/// Uploader that copies artifacts into a local artifact store.
#[derive(Clone, Debug)]
pub struct DirectoryUploader {
    root: PathBuf,
}

impl DirectoryUploader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Reject destinations that would escape the store.
fn checked_dest(dest: &str) -> Result<&Path, UploadError> {
    let path = Path::new(dest);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            std::path::Component::ParentDir
                | std::path::Component::RootDir
                | std::path::Component::Prefix(_)
        )
    });
    if escapes {
        return Err(UploadError::InvalidDestination(dest.to_string()));
    }
    Ok(path)
}

#[async_trait]
impl ArtifactUploader for DirectoryUploader {
    async fn upload(&self, file: &Path, dest: &str) -> Result<(), UploadError> {
        let dest_dir = self.root.join(checked_dest(dest)?);
        let Some(name) = file.file_name() else {
            return Err(UploadError::Rejected(format!("{} has no file name", file.display())));
        };
        tokio::fs::create_dir_all(&dest_dir)
            .await
            .map_err(|source| UploadError::Io { path: dest_dir.clone(), source })?;
        let target = dest_dir.join(name);
        tokio::fs::copy(file, &target)
            .await
            .map_err(|source| UploadError::Io { path: file.to_path_buf(), source })?;
        tracing::debug!(file = %file.display(), target = %target.display(), "artifact stored");
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ArtifactUploader, UploadError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Recorded upload
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct UploadCall {
        pub file: PathBuf,
        pub dest: String,
    }

    #[derive(Default)]
    struct FakeUploaderState {
        calls: Vec<UploadCall>,
        fail_on: Option<String>,
        fail_once_on: Option<String>,
    }

    /// Fake uploader for testing
    #[derive(Clone, Default)]
    pub struct FakeUploader {
        inner: Arc<Mutex<FakeUploaderState>>,
    }

    impl FakeUploader {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail uploads of files whose name contains `needle`.
        pub fn fail_on(&self, needle: &str) {
            self.inner.lock().fail_on = Some(needle.to_string());
        }

        /// Fail only the next upload of a file whose name contains `needle`.
        pub fn fail_once_on(&self, needle: &str) {
            self.inner.lock().fail_once_on = Some(needle.to_string());
        }

        pub fn calls(&self) -> Vec<UploadCall> {
            self.inner.lock().calls.clone()
        }

        /// `(file name, dest)` pairs, sorted, for order-independent asserts.
        pub fn uploaded(&self) -> Vec<(String, String)> {
            let mut pairs: Vec<_> = self
                .inner
                .lock()
                .calls
                .iter()
                .map(|c| {
                    let name = c.file.file_name().map(|n| n.to_string_lossy().into_owned());
                    (name.unwrap_or_default(), c.dest.clone())
                })
                .collect();
            pairs.sort();
            pairs
        }
    }

    #[async_trait]
    impl ArtifactUploader for FakeUploader {
        async fn upload(&self, file: &Path, dest: &str) -> Result<(), UploadError> {
            let mut inner = self.inner.lock();
            inner.calls.push(UploadCall { file: file.to_path_buf(), dest: dest.to_string() });
            let name = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            if let Some(needle) = &inner.fail_on {
                if name.contains(needle.as_str()) {
                    return Err(UploadError::Rejected(format!("refused {name}")));
                }
            }
            if inner.fail_once_on.as_deref().is_some_and(|needle| name.contains(needle)) {
                inner.fail_once_on = None;
                return Err(UploadError::Rejected(format!("refused {name}")));
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeUploader, UploadCall};

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
