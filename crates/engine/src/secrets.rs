// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Masking of registered secrets in console output.

/// Secrets registered during a run, with their replacement text.
#[derive(Debug, Clone, Default)]
pub struct SecretMasker {
    entries: Vec<(String, String)>,
}

impl SecretMasker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value`; empty values are ignored.
    pub fn add(&mut self, value: impl Into<String>, substitution: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.entries.push((value, substitution.into()));
        // Longest first, so a secret containing another is replaced whole.
        self.entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mask(&self, line: &str) -> String {
        self.entries
            .iter()
            .fold(line.to_string(), |acc, (value, substitution)| acc.replace(value, substitution))
    }
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
