// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::process::Stdio;

use relay_adapters::{ArtifactFetcher, ArtifactUploader, ConsoleSink, StatusReporter};
use relay_core::BuildCommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::OperationError;
use crate::session::{BuildSession, RunState, Scope};

impl<R, C, U, F> BuildSession<R, C, U, F>
where
    R: StatusReporter,
    C: ConsoleSink,
    U: ArtifactUploader,
    F: ArtifactFetcher,
{
    /// Run an external program to completion.
    ///
    /// Stdout and stderr lines reach the console as the process writes them.
    pub(super) async fn exec(
        &self,
        command: &BuildCommand,
        run: &mut RunState,
        scope: &mut Scope,
    ) -> Result<(), OperationError> {
        let program = command.string_arg("command");
        let args = command.array_arg("args");
        let dir = self.node_dir(command);
        if !dir.is_dir() {
            return Err(OperationError::WorkingDirectory(dir.display().to_string()));
        }

        tracing::debug!(
            job_id = %self.config.job_id,
            program = %program,
            ?args,
            cwd = %dir.display(),
            "spawning process"
        );

        let spawn_error = |source| OperationError::Spawn { command: program.clone(), source };
        let mut child = Command::new(&program)
            .args(&args)
            .current_dir(&dir)
            .envs(&run.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(spawn_error(std::io::Error::other("output pipes unavailable")));
        };
        let mut stdout = BufReader::new(stdout).split(b'\n');
        let mut stderr = BufReader::new(stderr).split(b'\n');
        let (mut stdout_open, mut stderr_open) = (true, true);

        while stdout_open || stderr_open {
            let (segment, from_stdout) = tokio::select! {
                segment = stdout.next_segment(), if stdout_open => (segment, true),
                segment = stderr.next_segment(), if stderr_open => (segment, false),
                else => break,
            };
            match segment {
                Ok(Some(bytes)) => {
                    let line = String::from_utf8_lossy(&bytes);
                    self.emit(run, scope, line.strip_suffix('\r').unwrap_or(&line));
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        job_id = %self.config.job_id,
                        program = %program,
                        error = %e,
                        "failed to read process output"
                    );
                }
            }
            if from_stdout {
                stdout_open = false;
            } else {
                stderr_open = false;
            }
        }

        let status = child.wait().await.map_err(spawn_error)?;
        if status.success() {
            Ok(())
        } else {
            Err(OperationError::ExitStatus { command: program, status: status.to_string() })
        }
    }
}
