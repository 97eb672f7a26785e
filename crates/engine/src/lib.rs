// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-engine: interprets build command trees.
//!
//! A [`BuildSession`] walks a tree node by node, applying run conditions,
//! test guards and cancellation, and reports the job through its adapters.

pub mod artifacts;
pub mod checksum;
mod config;
pub mod env;
pub mod logging;
mod operations;
mod secrets;
mod session;
mod template;

pub use artifacts::{plan_uploads, PlannedUpload, PublishError};
pub use checksum::{ChecksumError, ChecksumFileHandler, ChecksumManifest, ChecksumOutcome, ChecksumValidator};
pub use config::SessionConfig;
pub use operations::OperationError;
pub use secrets::SecretMasker;
pub use session::{BuildSession, SessionDeps, SessionError};
pub use template::interpolate;
