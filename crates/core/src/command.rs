// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build command tree shipped from the server to an agent.
//!
//! A [`BuildCommand`] is built once per job, sent verbatim, and executed at
//! most once per agent run. Arguments are kept as a flat string map because
//! that is what travels on the wire; [`ArgValue`] is the typed input at
//! construction and the `*_arg` getters decode lazily.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use thiserror::Error;

use crate::job::JobResult;

/// Indentation width per depth level in [`BuildCommand::dump`].
const DUMP_INDENT: usize = 4;

/// Run condition gating a node against the job's accumulated result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunIf {
    #[default]
    Passed,
    Failed,
    Any,
}

impl RunIf {
    /// Whether a node with this condition runs given the result so far.
    pub fn admits(self, accumulated: JobResult) -> bool {
        match self {
            RunIf::Passed => !accumulated.is_failed(),
            RunIf::Failed => accumulated.is_failed(),
            RunIf::Any => true,
        }
    }
}

crate::simple_display! {
    RunIf {
        Passed => "passed",
        Failed => "failed",
        Any => "any",
    }
}

crate::simple_parse! {
    RunIf, RunIfParseError {
        Passed => "passed",
        Failed => "failed",
        Any => "any",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown run condition: {0:?}")]
pub struct RunIfParseError(pub String);

impl From<String> for RunIfParseError {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Operations an agent knows how to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Compose,
    Echo,
    Exec,
    Export,
    Secret,
    Fail,
    ReportCurrentStatus,
    ReportCompleting,
    Mkdirs,
    Cleandir,
    Test,
    UploadArtifact,
    DownloadFile,
    DownloadDir,
}

crate::simple_display! {
    Operation {
        Compose => "compose",
        Echo => "echo",
        Exec => "exec",
        Export => "export",
        Secret => "secret",
        Fail => "fail",
        ReportCurrentStatus => "reportCurrentStatus",
        ReportCompleting => "reportCompleting",
        Mkdirs => "mkdirs",
        Cleandir => "cleandir",
        Test => "test",
        UploadArtifact => "uploadArtifact",
        DownloadFile => "downloadFile",
        DownloadDir => "downloadDir",
    }
}

crate::simple_parse! {
    Operation, UnknownOperation {
        Compose => "compose",
        Echo => "echo",
        Exec => "exec",
        Export => "export",
        Secret => "secret",
        Fail => "fail",
        ReportCurrentStatus => "reportCurrentStatus",
        ReportCompleting => "reportCompleting",
        Mkdirs => "mkdirs",
        Cleandir => "cleandir",
        Test => "test",
        UploadArtifact => "uploadArtifact",
        DownloadFile => "downloadFile",
        DownloadDir => "downloadDir",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown command: {0}")]
pub struct UnknownOperation(pub String);

impl From<String> for UnknownOperation {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Typed argument value, flattened to a string when stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Bool(bool),
    Array(Vec<String>),
}

impl ArgValue {
    /// The flat wire representation of this value.
    pub fn encode(self) -> String {
        match self {
            ArgValue::Str(s) => s,
            ArgValue::Bool(b) => b.to_string(),
            ArgValue::Array(items) => serde_json::Value::from(items).to_string(),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Str(s)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(items: Vec<String>) -> Self {
        ArgValue::Array(items)
    }
}

impl From<&[&str]> for ArgValue {
    fn from(items: &[&str]) -> Self {
        ArgValue::Array(items.iter().map(|s| s.to_string()).collect())
    }
}

/// One node of a job's execution tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildCommand {
    name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    args: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_commands: Vec<BuildCommand>,
    #[serde(default, rename = "runIfConfig")]
    run_if: RunIf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    test: Option<Box<BuildCommand>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    on_cancel: Option<Box<BuildCommand>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    working_directory: Option<String>,
}

impl BuildCommand {
    /// A leaf node with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// A node with typed arguments, flattened at construction.
    pub fn with_args<K, V>(name: impl Into<String>, args: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ArgValue>,
    {
        let args = args.into_iter().map(|(k, v)| (k.into(), v.into().encode())).collect();
        Self { name: name.into(), args, ..Self::default() }
    }

    /// Wrap nodes under a synthetic `compose` node.
    pub fn compose(children: impl IntoIterator<Item = BuildCommand>) -> Self {
        Self {
            name: Operation::Compose.to_string(),
            sub_commands: children.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn echo(lines: &[&str]) -> Self {
        Self::with_args(Operation::Echo.to_string(), [("line", ArgValue::from(lines))])
    }

    pub fn exec(command: &str, args: &[&str]) -> Self {
        Self::with_args(
            Operation::Exec.to_string(),
            [("command", ArgValue::from(command)), ("args", ArgValue::from(args))],
        )
    }

    pub fn export(name: &str, value: &str, secure: bool) -> Self {
        Self::with_args(
            Operation::Export.to_string(),
            [
                ("name", ArgValue::from(name)),
                ("value", ArgValue::from(value)),
                ("secure", ArgValue::from(secure)),
            ],
        )
    }

    /// Export without a value: prints the variable's current value.
    pub fn export_current(name: &str) -> Self {
        Self::with_args(Operation::Export.to_string(), [("name", name)])
    }

    pub fn secret(value: &str) -> Self {
        Self::with_args(Operation::Secret.to_string(), [("value", value)])
    }

    pub fn secret_with_substitution(value: &str, substitution: &str) -> Self {
        Self::with_args(
            Operation::Secret.to_string(),
            [("value", value), ("substitution", substitution)],
        )
    }

    pub fn fail(message: &str) -> Self {
        Self::with_args(Operation::Fail.to_string(), [("message", message)])
    }

    pub fn report_current_status(status: crate::job::JobState) -> Self {
        Self::with_args(
            Operation::ReportCurrentStatus.to_string(),
            [("status", status.to_string())],
        )
    }

    pub fn report_completing() -> Self {
        Self::new(Operation::ReportCompleting.to_string())
    }

    pub fn mkdirs(path: &str) -> Self {
        Self::with_args(Operation::Mkdirs.to_string(), [("path", path)])
    }

    pub fn cleandir(path: &str, allowed: &[&str]) -> Self {
        Self::with_args(
            Operation::Cleandir.to_string(),
            [("path", ArgValue::from(path)), ("allowed", ArgValue::from(allowed))],
        )
    }

    /// Path predicate: `-d`, `-nd`, `-f` or `-nf`.
    pub fn test(flag: &str, left: &str) -> Self {
        Self::with_args(Operation::Test.to_string(), [("flag", flag), ("left", left)])
    }

    /// Output predicate: `-eq` or `-neq` against the output of `command`.
    pub fn test_output(flag: &str, left: &str, command: BuildCommand) -> Self {
        let mut node = Self::test(flag, left);
        node.sub_commands.push(command);
        node
    }

    pub fn upload_artifact(src: &str, dest: &str) -> Self {
        Self::with_args(Operation::UploadArtifact.to_string(), [("src", src), ("dest", dest)])
    }

    /// Download `url` into `dest`. When `checksum_url` is set, the artifact
    /// is verified against the manifest entry for `src`.
    pub fn download_file(url: &str, dest: &str, src: &str, checksum_url: Option<&str>) -> Self {
        let mut args = vec![("url", url), ("dest", dest), ("src", src)];
        if let Some(checksum_url) = checksum_url {
            args.push(("checksumUrl", checksum_url));
        }
        Self::with_args(Operation::DownloadFile.to_string(), args)
    }

    /// Download a zipped directory from `url` and unpack it into `dest`.
    /// Entries are verified against the manifest under the `src` path.
    pub fn download_dir(url: &str, dest: &str, src: &str, checksum_url: Option<&str>) -> Self {
        let mut args = vec![("url", url), ("dest", dest), ("src", src)];
        if let Some(checksum_url) = checksum_url {
            args.push(("checksumUrl", checksum_url));
        }
        Self::with_args(Operation::DownloadDir.to_string(), args)
    }

    /// Set the run condition.
    pub fn run_if(mut self, condition: RunIf) -> Self {
        self.run_if = condition;
        self
    }

    pub fn with_test(mut self, test: BuildCommand) -> Self {
        self.test = Some(Box::new(test));
        self
    }

    pub fn with_on_cancel(mut self, on_cancel: BuildCommand) -> Self {
        self.on_cancel = Some(Box::new(on_cancel));
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the node name to a known operation.
    pub fn operation(&self) -> Result<Operation, UnknownOperation> {
        self.name.parse()
    }

    pub fn args(&self) -> &BTreeMap<String, String> {
        &self.args
    }

    pub fn sub_commands(&self) -> &[BuildCommand] {
        &self.sub_commands
    }

    pub fn run_condition(&self) -> RunIf {
        self.run_if
    }

    pub fn test_command(&self) -> Option<&BuildCommand> {
        self.test.as_deref()
    }

    pub fn on_cancel_command(&self) -> Option<&BuildCommand> {
        self.on_cancel.as_deref()
    }

    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }

    pub fn has_arg(&self, key: &str) -> bool {
        self.args.contains_key(key)
    }

    /// Raw string value; absent keys read as empty.
    pub fn string_arg(&self, key: &str) -> String {
        self.args.get(key).cloned().unwrap_or_default()
    }

    /// Only a case-insensitive `true` is true; absent keys read as false.
    pub fn boolean_arg(&self, key: &str) -> bool {
        self.args.get(key).is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Decode a JSON string array.
    ///
    /// Absent or empty values give an empty vector. A value that is not a
    /// JSON array of strings is treated as a single element.
    pub fn array_arg(&self, key: &str) -> Vec<String> {
        let Some(raw) = self.args.get(key) else {
            return Vec::new();
        };
        if raw.is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::debug!(key, error = %e, "arg is not an array, reading as one element");
                vec![raw.clone()]
            }
        }
    }

    /// Indented rendering, one node per line.
    pub fn dump(&self) -> String {
        let mut lines = Vec::new();
        self.dump_into(0, &mut lines);
        lines.join("\n")
    }

    fn dump_into(&self, depth: usize, lines: &mut Vec<String>) {
        let mut line = " ".repeat(depth * DUMP_INDENT);
        line.push_str(&self.name);
        for (key, value) in &self.args {
            let _ = write!(line, " {key}={value}");
        }
        lines.push(line);
        for child in &self.sub_commands {
            child.dump_into(depth + 1, lines);
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
