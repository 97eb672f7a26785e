// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation dispatch for the build session.
//!
//! Every operation returns `Result<(), OperationError>`; the dispatcher turns
//! an error into a console line plus a failed scope result.

mod artifact;
mod console;
mod exec;
mod fs;

use std::path::PathBuf;
use std::time::Instant;

use relay_adapters::{
    ArtifactFetcher, ArtifactUploader, ConsoleSink, FetchError, ServerStatus, StatusReporter,
    UploadError,
};
use relay_core::{BuildCommand, JobState, Operation, UnknownJobState, UnknownOperation};
use thiserror::Error;

use crate::artifacts::PublishError;
use crate::checksum::ChecksumError;
use crate::session::{BuildSession, RunState, Scope};

/// Why a single node failed.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Explicit `fail` node; the message is the console line.
    #[error("{0}")]
    Fail(String),

    #[error(transparent)]
    Unknown(#[from] UnknownOperation),

    #[error("Working directory \"{0}\" is not a directory!")]
    WorkingDirectory(String),

    #[error("Error happened while attempting to execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' exited with {status}")]
    ExitStatus { command: String, status: String },

    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory {0} already exists")]
    AlreadyExists(PathBuf),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Test failed: {flag} {left}")]
    TestFailed { flag: String, left: String },

    #[error("Unknown test flag: {0}")]
    UnknownTestFlag(String),

    #[error("Invalid job status: {0}")]
    InvalidStatus(#[from] UnknownJobState),

    #[error("Failed to upload [{src}]: {source}")]
    Upload {
        src: String,
        #[source]
        source: UploadError,
    },

    #[error(transparent)]
    Pattern(#[from] PublishError),

    #[error("Could not fetch artifact {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Could not fetch artifact {url}. Server responded with status {status}")]
    FetchStatus { url: String, status: ServerStatus },

    #[error("Could not fetch checksum manifest {url}. Server responded with status {status}")]
    VerificationDenied { url: String, status: ServerStatus },

    #[error("Could not unpack artifact {url}: {source}")]
    Archive {
        url: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Refusing to unpack [{0}] outside the destination directory")]
    UnsafeEntry(String),

    /// Downloaded content does not match the published checksum; the
    /// message is the console line.
    #[error("{0}")]
    ChecksumMismatch(String),

    #[error(transparent)]
    Checksum(#[from] ChecksumError),
}

impl OperationError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OperationError::Io { action, path: path.into(), source }
    }
}

impl<R, C, U, F> BuildSession<R, C, U, F>
where
    R: StatusReporter,
    C: ConsoleSink,
    U: ArtifactUploader,
    F: ArtifactFetcher,
{
    /// Run the body of `command`, recording any failure in `scope`.
    pub(crate) async fn execute(&self, command: &BuildCommand, run: &mut RunState, scope: &mut Scope) {
        let started = Instant::now();
        let outcome = self.dispatch(command, run, scope).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                tracing::debug!(command = command.name(), elapsed_ms, "command finished");
            }
            Err(e) => {
                tracing::warn!(
                    job_id = %self.config.job_id,
                    command = command.name(),
                    elapsed_ms,
                    error = %e,
                    "command failed"
                );
                let line = e.to_string();
                if line.is_empty() {
                    self.emit(run, scope, &format!("[relay] {} failed", command.name()));
                } else {
                    self.emit(run, scope, &line);
                }
                scope.fail();
            }
        }
    }

    async fn dispatch(
        &self,
        command: &BuildCommand,
        run: &mut RunState,
        scope: &mut Scope,
    ) -> Result<(), OperationError> {
        match command.operation()? {
            Operation::Compose => {
                for child in command.sub_commands() {
                    self.walk(child, run, scope).await;
                }
                Ok(())
            }
            Operation::Echo => self.echo(command, run, scope),
            Operation::Exec => self.exec(command, run, scope).await,
            Operation::Export => self.export(command, run, scope),
            Operation::Secret => self.secret(command, run),
            Operation::Fail => Err(OperationError::Fail(command.string_arg("message"))),
            Operation::ReportCurrentStatus => {
                let state = command.string_arg("status").parse::<JobState>()?;
                self.report_state(run, state).await;
                Ok(())
            }
            Operation::ReportCompleting => {
                self.report_completing(run, scope.result).await;
                Ok(())
            }
            Operation::Mkdirs => self.mkdirs(command),
            Operation::Cleandir => self.cleandir(command),
            Operation::Test => self.test(command, run, scope).await,
            Operation::UploadArtifact => self.upload_artifact(command, run, scope).await,
            Operation::DownloadFile => self.download_file(command, run, scope).await,
            Operation::DownloadDir => self.download_dir(command, run, scope).await,
        }
    }

    /// Directory a node's relative paths resolve against. Node working
    /// directories are always taken relative to the session root.
    pub(crate) fn node_dir(&self, command: &BuildCommand) -> PathBuf {
        match command.working_directory().map(|dir| dir.trim_start_matches(['/', '\\'])) {
            Some(dir) if !dir.is_empty() => self.config.working_dir.join(dir),
            _ => self.config.working_dir.clone(),
        }
    }
}
