// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-adapters: collaborators a build session talks to.
//!
//! Each concern is a trait with a production implementation and, behind
//! `test-support`, a recording fake.

pub mod console;
pub mod fetch;
pub mod report;
pub mod upload;

pub use console::{ConsoleSink, FileConsole, StdoutConsole};
pub use fetch::{
    conditional_url, ArtifactFetcher, DirectoryFetcher, FetchError, Fetched, ServerStatus,
};
pub use report::{ChannelStatusReporter, ReportError, StatusReport, StatusReporter};
pub use upload::{ArtifactUploader, DirectoryUploader, UploadError};

#[cfg(any(test, feature = "test-support"))]
pub use console::FakeConsole;
#[cfg(any(test, feature = "test-support"))]
pub use fetch::FakeFetcher;
#[cfg(any(test, feature = "test-support"))]
pub use report::FakeStatusReporter;
#[cfg(any(test, feature = "test-support"))]
pub use upload::{FakeUploader, UploadCall};
