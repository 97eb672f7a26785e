// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations that only touch the console and the job environment.

use relay_adapters::{ArtifactFetcher, ArtifactUploader, ConsoleSink, StatusReporter};
use relay_core::BuildCommand;

use super::OperationError;
use crate::session::{BuildSession, RunState, Scope};
use crate::template::interpolate;

/// Shown in place of a secure exported value.
const SECURE_VALUE_DISPLAY: &str = "********";

impl<R, C, U, F> BuildSession<R, C, U, F>
where
    R: StatusReporter,
    C: ConsoleSink,
    U: ArtifactUploader,
    F: ArtifactFetcher,
{
    pub(super) fn echo(
        &self,
        command: &BuildCommand,
        run: &RunState,
        scope: &mut Scope,
    ) -> Result<(), OperationError> {
        for line in command.array_arg("line") {
            let line = interpolate(&line, &self.config.variables);
            self.emit(run, scope, &line);
        }
        Ok(())
    }

    pub(super) fn export(
        &self,
        command: &BuildCommand,
        run: &mut RunState,
        scope: &mut Scope,
    ) -> Result<(), OperationError> {
        let name = command.string_arg("name");

        if !command.has_arg("value") {
            let current = run
                .env
                .get(&name)
                .cloned()
                .or_else(|| std::env::var(&name).ok())
                .unwrap_or_else(|| "null".to_string());
            let line = format!("[relay] setting environment variable '{name}' to value '{current}'");
            self.emit(run, scope, &line);
            return Ok(());
        }

        let value = command.string_arg("value");
        let shown = if command.boolean_arg("secure") { SECURE_VALUE_DISPLAY } else { value.as_str() };
        let exists = run.env.contains_key(&name) || std::env::var_os(&name).is_some();
        let line = if exists {
            format!("[relay] overriding environment variable '{name}' with value '{shown}'")
        } else {
            format!("[relay] setting environment variable '{name}' to value '{shown}'")
        };
        self.emit(run, scope, &line);
        run.env.insert(name, value);
        Ok(())
    }

    pub(super) fn secret(&self, command: &BuildCommand, run: &mut RunState) -> Result<(), OperationError> {
        let substitution = if command.has_arg("substitution") {
            command.string_arg("substitution")
        } else {
            self.config.secret_mask.clone()
        };
        run.secrets.add(command.string_arg("value"), substitution);
        Ok(())
    }
}
