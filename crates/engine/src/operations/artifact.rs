// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact publishing and checksum-verified download.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use relay_adapters::{
    conditional_url, ArtifactFetcher, ArtifactUploader, ConsoleSink, Fetched, ServerStatus,
    StatusReporter,
};
use relay_core::BuildCommand;

use super::OperationError;
use crate::artifacts::plan_uploads;
use crate::checksum::{
    digest_bytes, digest_file, ChecksumFileHandler, ChecksumManifest, ChecksumOutcome,
    ChecksumValidator,
};
use crate::env::CHECKSUM_DEST;
use crate::session::{BuildSession, RunState, Scope};

/// Subdirectory of the artifacts dir holding manifests fetched for downloads.
const FETCHED_MANIFEST_DIR: &str = "fetched";

/// One file unpacked from a downloaded directory archive.
struct ArchiveEntry {
    /// Path below the destination directory, slash-separated.
    name: String,
    body: Vec<u8>,
}

impl<R, C, U, F> BuildSession<R, C, U, F>
where
    R: StatusReporter,
    C: ConsoleSink,
    U: ArtifactUploader,
    F: ArtifactFetcher,
{
    /// Upload every file matched by `src`, then publish the updated
    /// checksum manifest.
    ///
    /// The run's manifest only takes the rule's checksums once the files
    /// and the manifest itself have been uploaded.
    pub(super) async fn upload_artifact(
        &self,
        command: &BuildCommand,
        run: &mut RunState,
        scope: &mut Scope,
    ) -> Result<(), OperationError> {
        let src = command.string_arg("src");
        let dest = command.string_arg("dest");
        let dir = self.node_dir(command);

        let plan = plan_uploads(&dir, &src, &dest)?;
        if plan.is_empty() {
            let line = format!(
                "[WARN] The rule [{src}] cannot match any resource under [{}]",
                dir.display()
            );
            self.emit(run, scope, &line);
            return Ok(());
        }

        let mut published = run.published.clone();
        for planned in &plan {
            let shown_dest = if planned.dest.is_empty() { "[defaultRoot]" } else { planned.dest.as_str() };
            let line = format!(
                "[relay] Uploading artifacts from {} to {shown_dest}",
                planned.file.display()
            );
            self.emit(run, scope, &line);

            let digest = digest_file(&planned.file)?;
            self.deps
                .uploader
                .upload(&planned.file, &planned.dest)
                .await
                .map_err(|source| OperationError::Upload { src: src.clone(), source })?;
            published.insert(&planned.artifact_path(), digest);
        }

        self.publish_manifest(&published).await?;
        run.published = published;

        tracing::info!(
            job_id = %self.config.job_id,
            rule = %src,
            files = plan.len(),
            "artifacts uploaded"
        );
        Ok(())
    }

    /// Write `manifest` and upload it. A failed upload restores the
    /// previously published copy on disk.
    async fn publish_manifest(&self, manifest: &ChecksumManifest) -> Result<(), OperationError> {
        let manifest_path = self.config.artifacts_dir.join(&self.config.checksum_file);
        let previous = ChecksumManifest::load(&manifest_path)?;
        manifest.write_to(&manifest_path)?;

        let uploaded = self.deps.uploader.upload(&manifest_path, CHECKSUM_DEST).await;
        if let Err(source) = uploaded {
            let restored = match previous {
                Some(previous) => previous.write_to(&manifest_path).map_err(OperationError::from),
                None => std::fs::remove_file(&manifest_path)
                    .map_err(|e| OperationError::io("remove", &manifest_path, e)),
            };
            if let Err(e) = restored {
                tracing::warn!(job_id = %self.config.job_id, error = %e, "failed to restore checksum manifest");
            }
            return Err(OperationError::Upload { src: self.config.checksum_file.clone(), source });
        }
        Ok(())
    }

    /// Fetch an artifact to `dest`, verifying it against the published
    /// manifest when `checksumUrl` is given.
    ///
    /// An existing `dest` turns the fetch into a conditional one; a
    /// `NotModified` answer keeps the local copy.
    pub(super) async fn download_file(
        &self,
        command: &BuildCommand,
        run: &mut RunState,
        scope: &mut Scope,
    ) -> Result<(), OperationError> {
        let url = command.string_arg("url");
        let src = command.string_arg("src");
        let dest = self.node_dir(command).join(command.string_arg("dest"));

        let validator = self.checksum_validator(command, run, scope).await?;

        let local_digest = if dest.is_file() { Some(digest_file(&dest)?) } else { None };
        let request_url = match &local_digest {
            Some(digest) => conditional_url(&url, digest),
            None => url.clone(),
        };
        let fetched = self.fetch(&request_url).await?;

        let (body, unchanged) = match (fetched.status, local_digest) {
            (ServerStatus::Ok, _) => (fetched.body, false),
            (ServerStatus::NotModified, Some(_)) => {
                let body = std::fs::read(&dest).map_err(|e| OperationError::io("read", &dest, e))?;
                (body, true)
            }
            (status, _) => return Err(OperationError::FetchStatus { url, status }),
        };

        let outcome = validator.validate(&src, &digest_bytes(&body));
        if !outcome.is_acceptable() {
            let message = outcome.console_message(&src).unwrap_or_default();
            return Err(OperationError::ChecksumMismatch(message));
        }

        if unchanged {
            let line = format!(
                "[relay] Artifact [{}] is unchanged on the server, keeping the local copy.",
                dest.display()
            );
            self.emit(run, scope, &line);
            return Ok(());
        }

        write_file(&dest, &body)?;
        self.report_saved(run, scope, &dest, &[(src.as_str(), &outcome)]);
        Ok(())
    }

    /// Fetch a zipped directory and unpack it into `dest`.
    ///
    /// Entries are checked against the manifest under the parent of `src`,
    /// so `src = "s/log"` with entry `log/a` is looked up as `s/log/a`.
    /// Nothing is written unless every entry passes.
    pub(super) async fn download_dir(
        &self,
        command: &BuildCommand,
        run: &mut RunState,
        scope: &mut Scope,
    ) -> Result<(), OperationError> {
        let url = command.string_arg("url");
        let src = command.string_arg("src");
        let dest = self.node_dir(command).join(command.string_arg("dest"));

        let validator = self.checksum_validator(command, run, scope).await?;

        let fetched = self.fetch(&url).await?;
        if fetched.status != ServerStatus::Ok {
            return Err(OperationError::FetchStatus { url, status: fetched.status });
        }
        let entries = unpack(&url, &fetched.body)?;

        let mut checked = Vec::with_capacity(entries.len());
        for entry in &entries {
            let artifact_path = archive_artifact_path(&src, &entry.name);
            let outcome = validator.validate(&artifact_path, &digest_bytes(&entry.body));
            if !outcome.is_acceptable() {
                let message = outcome.console_message(&artifact_path).unwrap_or_default();
                return Err(OperationError::ChecksumMismatch(message));
            }
            checked.push((artifact_path, outcome));
        }

        for entry in &entries {
            write_file(&dest.join(&entry.name), &entry.body)?;
        }

        let outcomes: Vec<(&str, &ChecksumOutcome)> =
            checked.iter().map(|(path, outcome)| (path.as_str(), outcome)).collect();
        self.report_saved(run, scope, &dest, &outcomes);
        tracing::info!(
            job_id = %self.config.job_id,
            url = %url,
            files = entries.len(),
            "artifact directory unpacked"
        );
        Ok(())
    }

    /// Validator for a download: backed by the manifest at `checksumUrl`,
    /// or empty when the command names none.
    async fn checksum_validator(
        &self,
        command: &BuildCommand,
        run: &RunState,
        scope: &mut Scope,
    ) -> Result<ChecksumValidator, OperationError> {
        if command.has_arg("checksumUrl") {
            self.fetch_manifest(&command.string_arg("checksumUrl"), run, scope).await
        } else {
            Ok(ChecksumValidator::new(None))
        }
    }

    /// Refresh the local copy of the manifest published at `checksum_url`
    /// and load it.
    async fn fetch_manifest(
        &self,
        checksum_url: &str,
        run: &RunState,
        scope: &mut Scope,
    ) -> Result<ChecksumValidator, OperationError> {
        let handler = ChecksumFileHandler::new(self.fetched_manifest_path(checksum_url));
        let fetched = self.fetch(checksum_url).await?;

        if fetched.status == ServerStatus::Ok {
            handler.handle_body(&fetched.body)?;
        }
        let mut warnings = Vec::new();
        let proceed = handler.handle_result(fetched.status, |w| warnings.push(w.to_string()));
        for warning in &warnings {
            self.emit(run, scope, warning);
        }
        if !proceed {
            return Err(OperationError::VerificationDenied {
                url: checksum_url.to_string(),
                status: fetched.status,
            });
        }
        Ok(ChecksumValidator::load(handler.checksum_file())?)
    }

    /// Local copy of the manifest published at `checksum_url`. Each source
    /// gets its own copy, so a `NotModified` answer reuses that source's
    /// manifest only.
    fn fetched_manifest_path(&self, checksum_url: &str) -> PathBuf {
        self.config
            .artifacts_dir
            .join(FETCHED_MANIFEST_DIR)
            .join(digest_bytes(checksum_url.as_bytes()))
            .join(&self.config.checksum_file)
    }

    async fn fetch(&self, url: &str) -> Result<Fetched, OperationError> {
        self.deps
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| OperationError::Fetch { url: url.to_string(), source })
    }

    /// Console summary for a saved download. Missing manifest entries are
    /// warned about one by one.
    fn report_saved(
        &self,
        run: &RunState,
        scope: &mut Scope,
        dest: &Path,
        outcomes: &[(&str, &ChecksumOutcome)],
    ) {
        if !outcomes.is_empty() && outcomes.iter().all(|(_, outcome)| outcome.is_verified()) {
            let line = format!(
                "Saved artifact to [{}] after verifying the integrity of its contents.",
                dest.display()
            );
            self.emit(run, scope, &line);
            return;
        }
        for (path, outcome) in outcomes {
            if let ChecksumOutcome::EntryMissing = outcome {
                if let Some(warning) = outcome.console_message(path) {
                    self.emit(run, scope, &warning);
                }
            }
        }
        let line = format!(
            "Saved artifact to [{}] without verifying the integrity of its contents.",
            dest.display()
        );
        self.emit(run, scope, &line);
    }
}

fn write_file(path: &Path, body: &[u8]) -> Result<(), OperationError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| OperationError::io("create", parent, e))?;
    }
    std::fs::write(path, body).map_err(|e| OperationError::io("write", path, e))
}

/// Manifest key of an archive entry: the entry path below the parent of `src`.
fn archive_artifact_path(src: &str, entry: &str) -> String {
    match src.trim_matches('/').rsplit_once('/') {
        Some((parent, _)) => format!("{parent}/{entry}"),
        None => entry.to_string(),
    }
}

/// Read every file entry of a zip archive into memory.
fn unpack(url: &str, body: &[u8]) -> Result<Vec<ArchiveEntry>, OperationError> {
    let archive_error = |source| OperationError::Archive { url: url.to_string(), source };
    let mut archive = zip::ZipArchive::new(Cursor::new(body)).map_err(archive_error)?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(archive_error)?;
        if file.is_dir() {
            continue;
        }
        let Some(relative) = file.enclosed_name().map(Path::to_path_buf) else {
            return Err(OperationError::UnsafeEntry(file.name().to_string()));
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let mut body = Vec::new();
        file.read_to_end(&mut body)
            .map_err(|e| archive_error(zip::result::ZipError::Io(e)))?;
        entries.push(ArchiveEntry { name, body });
    }
    Ok(entries)
}
