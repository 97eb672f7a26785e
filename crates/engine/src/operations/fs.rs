// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem operations and the `test` predicate.

use std::path::Path;

use relay_adapters::{ArtifactFetcher, ArtifactUploader, ConsoleSink, StatusReporter};
use relay_core::BuildCommand;

use super::OperationError;
use crate::session::{BuildSession, RunState, Scope};

impl<R, C, U, F> BuildSession<R, C, U, F>
where
    R: StatusReporter,
    C: ConsoleSink,
    U: ArtifactUploader,
    F: ArtifactFetcher,
{
    pub(super) fn mkdirs(&self, command: &BuildCommand) -> Result<(), OperationError> {
        let path = self.node_dir(command).join(command.string_arg("path"));
        if path.exists() {
            return Err(OperationError::AlreadyExists(path));
        }
        std::fs::create_dir_all(&path).map_err(|e| OperationError::io("create", &path, e))
    }

    /// Empty a directory, keeping the `allowed` paths (relative to it).
    pub(super) fn cleandir(&self, command: &BuildCommand) -> Result<(), OperationError> {
        let root = self.node_dir(command).join(command.string_arg("path"));
        if !root.is_dir() {
            return Err(OperationError::NotADirectory(root));
        }
        let allowed: Vec<String> = command
            .array_arg("allowed")
            .iter()
            .map(|p| p.replace('\\', "/").trim_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        clean_dir(&root, &root, &allowed)
    }

    pub(super) async fn test(
        &self,
        command: &BuildCommand,
        run: &mut RunState,
        scope: &Scope,
    ) -> Result<(), OperationError> {
        let flag = command.string_arg("flag");
        let left = command.string_arg("left");
        let dir = self.node_dir(command);

        let holds = match flag.as_str() {
            "-d" => dir.join(&left).is_dir(),
            "-nd" => !dir.join(&left).is_dir(),
            "-f" => dir.join(&left).is_file(),
            "-nf" => !dir.join(&left).is_file(),
            "-eq" | "-neq" => {
                // The operand's own failure does not matter, only its output.
                let output = match command.sub_commands().first() {
                    Some(operand) => self.capture_output(operand, run, scope.cleanup).await,
                    None => String::new(),
                };
                (output == left) == (flag == "-eq")
            }
            _ => return Err(OperationError::UnknownTestFlag(flag)),
        };

        if holds {
            Ok(())
        } else {
            Err(OperationError::TestFailed { flag, left })
        }
    }
}

/// Slash-separated path of `path` below `root`.
fn relative_key(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .map(|rel| rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/"))
        .unwrap_or_default()
}

fn clean_dir(dir: &Path, root: &Path, allowed: &[String]) -> Result<(), OperationError> {
    let entries = std::fs::read_dir(dir).map_err(|e| OperationError::io("read", dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| OperationError::io("read", dir, e))?;
        let path = entry.path();
        let key = relative_key(&path, root);
        if allowed.iter().any(|a| *a == key) {
            continue;
        }

        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let prefix = format!("{key}/");
        let holds_allowed = allowed.iter().any(|a| a.starts_with(&prefix));

        if is_dir && holds_allowed {
            clean_dir(&path, root, allowed)?;
        } else if is_dir {
            std::fs::remove_dir_all(&path).map_err(|e| OperationError::io("remove", &path, e))?;
        } else {
            std::fs::remove_file(&path).map_err(|e| OperationError::io("remove", &path, e))?;
        }
    }
    Ok(())
}
