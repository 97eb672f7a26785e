// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server response class for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerStatus {
    Ok,
    NotModified,
    NotFound,
    Forbidden,
    Other(u16),
}

impl ServerStatus {
    pub fn code(self) -> u16 {
        match self {
            ServerStatus::Ok => 200,
            ServerStatus::NotModified => 304,
            ServerStatus::NotFound => 404,
            ServerStatus::Forbidden => 403,
            ServerStatus::Other(code) => code,
        }
    }
}

impl From<u16> for ServerStatus {
    fn from(code: u16) -> Self {
        match code {
            200 => ServerStatus::Ok,
            304 => ServerStatus::NotModified,
            404 => ServerStatus::NotFound,
            403 => ServerStatus::Forbidden,
            other => ServerStatus::Other(other),
        }
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A server response: status plus body (empty unless `Ok`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub status: ServerStatus,
    pub body: Vec<u8>,
}

impl Fetched {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self { status: ServerStatus::Ok, body: body.into() }
    }

    pub fn status(status: ServerStatus) -> Self {
        Self { status, body: Vec::new() }
    }
}

/// Errors reaching the server at all, as opposed to an unsuccessful status.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not reach {url}: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Query parameter carrying the digest of the copy the client already holds.
pub const DIGEST_QUERY: &str = "sha256";

/// Append the digest of a local copy to `url`, making the fetch conditional.
pub fn conditional_url(url: &str, digest: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{DIGEST_QUERY}={digest}")
}

/// Split a url into its path and the client digest, if one was sent.
fn split_conditional(url: &str) -> (&str, Option<&str>) {
    let Some((path, query)) = url.split_once('?') else {
        return (url, None);
    };
    let digest = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == DIGEST_QUERY)
        .map(|(_, value)| value);
    (path, digest)
}

/// Retrieves artifacts and checksum manifests from the server.
#[async_trait]
pub trait ArtifactFetcher: Clone + Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchError>;
}

/// Fetcher that serves a local artifact store, keyed by relative path.
///
/// A request carrying the digest of the stored file is answered with
/// `NotModified` and no body.
#[derive(Clone, Debug)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactFetcher for DirectoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        let (path, client_digest) = split_conditional(url);
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
            return Ok(Fetched::status(ServerStatus::Forbidden));
        }
        let path = self.root.join(relative);
        match tokio::fs::read(&path).await {
            Ok(body) => match client_digest {
                Some(digest) if digest.eq_ignore_ascii_case(&format!("{:x}", Sha256::digest(&body))) => {
                    Ok(Fetched::status(ServerStatus::NotModified))
                }
                _ => Ok(Fetched::ok(body)),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Fetched::status(ServerStatus::NotFound))
            }
            Err(source) => Err(FetchError::Io { path, source }),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ArtifactFetcher, FetchError, Fetched};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeFetcherState {
        responses: HashMap<String, Fetched>,
        calls: Vec<String>,
    }

    /// Fake fetcher with canned responses; unknown urls are unreachable.
    #[derive(Clone, Default)]
    pub struct FakeFetcher {
        inner: Arc<Mutex<FakeFetcherState>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, url: &str, response: Fetched) {
            self.inner.lock().responses.insert(url.to_string(), response);
        }

        pub fn calls(&self) -> Vec<String> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl ArtifactFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
            let mut inner = self.inner.lock();
            inner.calls.push(url.to_string());
            inner.responses.get(url).cloned().ok_or_else(|| FetchError::Unreachable {
                url: url.to_string(),
                reason: "no canned response".to_string(),
            })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeFetcher;

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
