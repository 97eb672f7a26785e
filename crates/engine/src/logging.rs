// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic tracing for hosts embedding the engine.
//!
//! Job console output goes through [`relay_adapters::ConsoleSink`] and is
//! unaffected by this filter.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global subscriber writing compact lines to stderr.
///
/// Reads `RUST_LOG`; defaults to `warn`. Fails if a subscriber is already
/// installed.
pub fn init() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
